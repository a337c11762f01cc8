mod client;
mod config;
mod dynamodb;
mod item;
mod s3;
mod table;

use std::sync::Arc;

use tracing::info;

use fragments_store::Storage;

pub use client::{build_dynamodb_client, build_s3_client, build_sdk_config};
pub use config::AwsStorageConfig;
pub use dynamodb::DynamoMetadataStore;
pub use s3::S3BlobStore;
pub use table::create_table;

/// Backend name reported by [`aws_storage`].
pub const BACKEND_NAME: &str = "aws";

/// Build a [`Storage`] handle with metadata in `DynamoDB` and bytes in S3.
///
/// Clients are created here; no AWS call is made until the first operation.
pub async fn aws_storage(config: &AwsStorageConfig) -> Storage {
    let sdk_config = build_sdk_config(config).await;
    let dynamodb = build_dynamodb_client(&sdk_config, config);
    let s3 = build_s3_client(&sdk_config, config);

    info!(
        region = %config.region,
        table = %config.table_name,
        bucket = %config.bucket,
        "using AWS fragment storage"
    );

    Storage::new(
        BACKEND_NAME,
        Arc::new(DynamoMetadataStore::from_client(dynamodb, &config.table_name)),
        Arc::new(S3BlobStore::from_client(s3, &config.bucket)),
    )
}
