use serde::Deserialize;

use fragments_service::DEFAULT_MAX_FRAGMENT_SIZE;

/// Per-fragment limits.
#[derive(Debug, Deserialize)]
pub struct FragmentLimitsConfig {
    /// Largest body accepted on create, in bytes.
    ///
    /// Also used as the HTTP request body ceiling.
    #[serde(default = "default_max_size")]
    pub max_size_bytes: usize,
}

impl Default for FragmentLimitsConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size(),
        }
    }
}

fn default_max_size() -> usize {
    DEFAULT_MAX_FRAGMENT_SIZE
}
