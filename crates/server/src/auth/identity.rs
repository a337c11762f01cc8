use fragments_core::{OwnerId, hash_owner};

/// Name every request runs as when authentication is disabled.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Authenticated caller, inserted into request extensions by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    /// Login name as presented by the caller.
    pub username: String,
    /// Hashed owner id used to partition storage.
    pub owner_id: OwnerId,
}

impl OwnerIdentity {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            owner_id: hash_owner(username),
        }
    }

    /// Identity used when auth is disabled.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER)
    }
}
