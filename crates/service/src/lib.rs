pub mod error;
pub mod fragment;
pub mod service;

pub use error::FragmentError;
pub use fragment::Fragment;
pub use fragments_convert::Converted;
pub use service::{DEFAULT_MAX_FRAGMENT_SIZE, FragmentService};
