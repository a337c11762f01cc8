use sha2::{Digest, Sha256};

/// Opaque owner identifier, as produced by [`hash_owner`].
pub type OwnerId = String;

/// Derive the owner id for an authenticated identity (lowercase hex SHA-256).
///
/// Keeps raw user names and e-mail addresses out of storage keys.
pub fn hash_owner(identity: &str) -> OwnerId {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hex::encode(hasher.finalize())
}
