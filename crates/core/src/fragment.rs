use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MediaTypeError;
use crate::media::MediaType;
use crate::owner::OwnerId;

/// Opaque fragment identifier.
pub type FragmentId = String;

/// Metadata persisted for every fragment.
///
/// Serialized as camelCase JSON with the media type under `type`, which is
/// the shape returned by the fragment info and list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    /// Unique identifier, fixed at creation.
    pub id: FragmentId,

    /// Owner the fragment is partitioned under.
    pub owner_id: OwnerId,

    /// Creation timestamp.
    pub created: DateTime<Utc>,

    /// Last time metadata or bytes were written.
    pub updated: DateTime<Utc>,

    /// Full media type, optionally carrying a charset parameter.
    #[serde(rename = "type")]
    pub content_type: String,

    /// Length of the most recently stored byte payload.
    pub size: u64,
}

impl FragmentRecord {
    /// Generate a fresh fragment id.
    #[must_use]
    pub fn generate_id() -> FragmentId {
        Uuid::new_v4().to_string()
    }

    /// Parse the stored media type.
    pub fn media_type(&self) -> Result<MediaType, MediaTypeError> {
        MediaType::parse(&self.content_type)
    }
}
