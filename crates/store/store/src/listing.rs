use fragments_core::{FragmentId, FragmentRecord};
use serde::{Deserialize, Serialize};

/// Result of listing an owner's fragments.
///
/// Serializes as a bare JSON array of ids or of full records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FragmentListing {
    Ids(Vec<FragmentId>),
    Expanded(Vec<FragmentRecord>),
}

impl FragmentListing {
    /// Build a listing from full records, keeping only ids unless `expand` is set.
    #[must_use]
    pub fn from_records(records: Vec<FragmentRecord>, expand: bool) -> Self {
        if expand {
            Self::Expanded(records)
        } else {
            Self::Ids(records.into_iter().map(|r| r.id).collect())
        }
    }

    /// An empty listing of the requested shape.
    #[must_use]
    pub fn empty(expand: bool) -> Self {
        Self::from_records(Vec::new(), expand)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Expanded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fragment ids in listing order, whatever the shape.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Ids(ids) => ids.iter().map(String::as_str).collect(),
            Self::Expanded(records) => records.iter().map(|r| r.id.as_str()).collect(),
        }
    }
}
