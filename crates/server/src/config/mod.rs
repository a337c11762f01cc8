mod auth;
mod fragments;
mod server;
mod storage;

pub use auth::*;
pub use fragments::*;
pub use server::*;
pub use storage::*;

use serde::Deserialize;

/// Top-level configuration for the fragments server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct FragmentsConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Fragment limits.
    #[serde(default)]
    pub fragments: FragmentLimitsConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthRefConfig,
}

impl FragmentsConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
