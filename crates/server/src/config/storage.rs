use serde::Deserialize;

/// Storage backend configuration.
///
/// Every field is optional; unset values fall back to the `AWS_*`
/// environment variables and then to the backend's own defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// `"memory"` or `"aws"`. When unset the backend is picked from the
    /// environment.
    pub backend: Option<String>,
    /// AWS region.
    pub region: Option<String>,
    /// DynamoDB table holding fragment metadata.
    pub table_name: Option<String>,
    /// S3 bucket holding fragment bytes.
    pub bucket: Option<String>,
    /// DynamoDB endpoint override (DynamoDB Local).
    pub dynamodb_endpoint_url: Option<String>,
    /// S3 endpoint override (LocalStack, MinIO).
    pub s3_endpoint_url: Option<String>,
}

impl StorageConfig {
    /// Fill unset fields from environment variables.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        self.region = self.region.or_else(|| lookup("AWS_REGION"));
        self.bucket = self.bucket.or_else(|| lookup("AWS_S3_BUCKET_NAME"));
        self.table_name = self.table_name.or_else(|| lookup("AWS_DYNAMODB_TABLE_NAME"));
        self.s3_endpoint_url = self.s3_endpoint_url.or_else(|| lookup("AWS_S3_ENDPOINT_URL"));
        self.dynamodb_endpoint_url = self
            .dynamodb_endpoint_url
            .or_else(|| lookup("AWS_DYNAMODB_ENDPOINT_URL"));
        self
    }

    /// Name of the backend to build.
    ///
    /// An explicit `backend` wins; otherwise a configured region selects
    /// `"aws"` and anything else selects `"memory"`.
    pub fn resolved_backend(&self) -> &str {
        match (&self.backend, &self.region) {
            (Some(backend), _) => backend.as_str(),
            (None, Some(_)) => "aws",
            (None, None) => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn no_region_means_memory() {
        let config = StorageConfig::default().with_overrides_from(env(&[]));
        assert_eq!(config.resolved_backend(), "memory");
    }

    #[test]
    fn region_in_env_selects_aws() {
        let config = StorageConfig::default().with_overrides_from(env(&[
            ("AWS_REGION", "us-east-1"),
            ("AWS_S3_BUCKET_NAME", "bytes"),
            ("AWS_DYNAMODB_TABLE_NAME", "meta"),
            ("AWS_S3_ENDPOINT_URL", "http://localhost:4566"),
            ("AWS_DYNAMODB_ENDPOINT_URL", "http://localhost:8000"),
        ]));
        assert_eq!(config.resolved_backend(), "aws");
        assert_eq!(config.bucket.as_deref(), Some("bytes"));
        assert_eq!(config.table_name.as_deref(), Some("meta"));
        assert_eq!(
            config.dynamodb_endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
    }

    #[test]
    fn file_values_win_over_env() {
        let config = StorageConfig {
            bucket: Some("from-file".to_owned()),
            ..StorageConfig::default()
        }
        .with_overrides_from(env(&[("AWS_S3_BUCKET_NAME", "from-env")]));
        assert_eq!(config.bucket.as_deref(), Some("from-file"));
    }

    #[test]
    fn explicit_backend_wins_over_region() {
        let config = StorageConfig {
            backend: Some("memory".to_owned()),
            region: Some("us-east-1".to_owned()),
            ..StorageConfig::default()
        };
        assert_eq!(config.resolved_backend(), "memory");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = StorageConfig::default().with_overrides_from(env(&[("AWS_REGION", "  ")]));
        assert!(config.region.is_none());
        assert_eq!(config.resolved_backend(), "memory");
    }
}
