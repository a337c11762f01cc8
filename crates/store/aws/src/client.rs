use tracing::debug;

use crate::config::AwsStorageConfig;

/// Load the shared SDK configuration from the standard AWS environment chain,
/// pinned to the configured region.
pub async fn build_sdk_config(config: &AwsStorageConfig) -> aws_config::SdkConfig {
    aws_config::from_env()
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await
}

/// Build a `DynamoDB` client, applying the endpoint override if one is set.
pub fn build_dynamodb_client(
    sdk_config: &aws_config::SdkConfig,
    config: &AwsStorageConfig,
) -> aws_sdk_dynamodb::Client {
    let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
    if let Some(endpoint) = &config.dynamodb_endpoint_url {
        debug!(endpoint = %endpoint, "using custom DynamoDB endpoint");
        builder = builder.endpoint_url(endpoint);
    }
    aws_sdk_dynamodb::Client::from_conf(builder.build())
}

/// Build an S3 client, applying the endpoint override and addressing style.
pub fn build_s3_client(
    sdk_config: &aws_config::SdkConfig,
    config: &AwsStorageConfig,
) -> aws_sdk_s3::Client {
    let mut builder =
        aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(config.force_path_style);
    if let Some(endpoint) = &config.s3_endpoint_url {
        debug!(endpoint = %endpoint, "using custom S3 endpoint");
        builder = builder.endpoint_url(endpoint);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}
