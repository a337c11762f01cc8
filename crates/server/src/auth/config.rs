use serde::Deserialize;

/// Top-level schema for `auth.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthFileConfig {
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// A user that authenticates with HTTP Basic credentials.
#[derive(Debug, Deserialize)]
pub struct UserConfig {
    /// Login name, usually an e-mail address.
    pub username: String,
    /// Argon2 PHC string, as printed by `fragments-server hash-password`.
    pub password_hash: String,
}

impl AuthFileConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
