#[cfg(feature = "aws")]
use fragments_store_aws::{
    AwsStorageConfig, aws_storage, build_dynamodb_client, build_sdk_config, create_table,
};
use fragments_store::Storage;
use fragments_store_memory::memory_storage;
use tracing::info;

use crate::config::StorageConfig;
use crate::error::ServerError;

/// Construct the fragment [`Storage`] from configuration.
///
/// Called once at start-up; the handle is cloned into every request.
pub async fn create_storage(config: &StorageConfig) -> Result<Storage, ServerError> {
    match config.resolved_backend() {
        "memory" => Ok(create_memory()),
        #[cfg(feature = "aws")]
        "aws" => create_aws(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported storage backend: {other} (is the feature enabled?)"
        ))),
    }
}

fn create_memory() -> Storage {
    info!("using in-memory fragment storage");
    memory_storage()
}

#[cfg(feature = "aws")]
fn aws_config(config: &StorageConfig) -> AwsStorageConfig {
    let defaults = AwsStorageConfig::default();
    AwsStorageConfig {
        region: config.region.clone().unwrap_or(defaults.region),
        table_name: config.table_name.clone().unwrap_or(defaults.table_name),
        bucket: config.bucket.clone().unwrap_or(defaults.bucket),
        force_path_style: config.s3_endpoint_url.is_some(),
        dynamodb_endpoint_url: config.dynamodb_endpoint_url.clone(),
        s3_endpoint_url: config.s3_endpoint_url.clone(),
    }
}

#[cfg(feature = "aws")]
async fn create_aws(config: &StorageConfig) -> Result<Storage, ServerError> {
    let aws = aws_config(config);

    // Local DynamoDB starts empty.
    if aws.dynamodb_endpoint_url.is_some() {
        let sdk_config = build_sdk_config(&aws).await;
        let client = build_dynamodb_client(&sdk_config, &aws);
        create_table(&client, &aws.table_name)
            .await
            .map_err(|e| ServerError::Config(format!("dynamodb table: {e}")))?;
    }

    Ok(aws_storage(&aws).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_builds_memory_storage() {
        let storage = create_storage(&StorageConfig::default()).await.unwrap();
        assert_eq!(storage.backend(), "memory");
    }

    #[tokio::test]
    async fn unknown_backend_is_a_config_error() {
        let config = StorageConfig {
            backend: Some("redis".to_owned()),
            ..StorageConfig::default()
        };
        let err = create_storage(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(msg) if msg.contains("redis")));
    }

    #[cfg(feature = "aws")]
    #[test]
    fn aws_config_falls_back_to_defaults() {
        let aws = aws_config(&StorageConfig {
            backend: Some("aws".to_owned()),
            bucket: Some("bytes".to_owned()),
            s3_endpoint_url: Some("http://localhost:4566".to_owned()),
            ..StorageConfig::default()
        });
        assert_eq!(aws.region, "us-east-1");
        assert_eq!(aws.table_name, "fragments");
        assert_eq!(aws.bucket, "bytes");
        assert!(aws.force_path_style);
        assert!(aws.dynamodb_endpoint_url.is_none());
    }
}
