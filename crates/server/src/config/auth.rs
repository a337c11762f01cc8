use serde::Deserialize;

/// Reference to the external `auth.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct AuthRefConfig {
    /// Whether HTTP Basic authentication is required.
    ///
    /// When disabled every request runs as the anonymous owner.
    #[serde(default)]
    pub enabled: bool,
    /// Path to `auth.toml`, relative to the main config file.
    pub config_path: Option<String>,
}
