use std::fmt;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};

use crate::error::StoreError;

/// Compound key addressing both the metadata record and the bytes of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub owner_id: OwnerId,
    pub id: FragmentId,
}

impl FragmentKey {
    /// Create a new fragment key.
    #[must_use]
    pub fn new(owner_id: impl Into<OwnerId>, id: impl Into<FragmentId>) -> Self {
        Self {
            owner_id: owner_id.into(),
            id: id.into(),
        }
    }

    /// Key of the fragment described by `record`.
    #[must_use]
    pub fn of(record: &FragmentRecord) -> Self {
        Self::new(record.owner_id.clone(), record.id.clone())
    }

    /// Object-store key for the fragment bytes.
    ///
    /// Format: `{owner_id}/{id}`
    #[must_use]
    pub fn object_key(&self) -> String {
        format!("{}/{}", self.owner_id, self.id)
    }

    /// Reject keys with an empty component, or an owner id containing `/`.
    ///
    /// A slash in the owner id would let two different keys render the same
    /// [`object_key`](Self::object_key).
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.owner_id.is_empty() {
            return Err(StoreError::InvalidKey("owner id is empty".to_owned()));
        }
        if self.owner_id.contains('/') {
            return Err(StoreError::InvalidKey(format!(
                "owner id contains '/': {}",
                self.owner_id
            )));
        }
        if self.id.is_empty() {
            return Err(StoreError::InvalidKey("fragment id is empty".to_owned()));
        }
        Ok(())
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.object_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_format() {
        let key = FragmentKey::new("owner-1", "abc-123");
        assert_eq!(key.object_key(), "owner-1/abc-123");
        assert_eq!(key.to_string(), "owner-1/abc-123");
    }

    #[test]
    fn empty_components_are_invalid() {
        assert!(FragmentKey::new("", "id").validate().is_err());
        assert!(FragmentKey::new("owner", "").validate().is_err());
        assert!(FragmentKey::new("owner", "id").validate().is_ok());
    }

    #[test]
    fn slash_only_allowed_in_fragment_id() {
        assert!(FragmentKey::new("a/x", "y").validate().is_err());
        assert!(FragmentKey::new("a", "x/y").validate().is_ok());
        assert_eq!(
            FragmentKey::new("a", "x/y").object_key(),
            FragmentKey::new("a/x", "y").object_key()
        );
    }
}
