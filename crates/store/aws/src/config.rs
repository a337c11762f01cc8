/// Configuration for the `DynamoDB` metadata store and the S3 blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsStorageConfig {
    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// `DynamoDB` table holding fragment metadata.
    pub table_name: String,

    /// S3 bucket holding fragment bytes.
    pub bucket: String,

    /// Optional `DynamoDB` endpoint override (e.g. `DynamoDB` Local).
    pub dynamodb_endpoint_url: Option<String>,

    /// Optional S3 endpoint override (e.g. `LocalStack` or `MinIO`).
    pub s3_endpoint_url: Option<String>,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    ///
    /// Required by most local S3 emulators.
    pub force_path_style: bool,
}

impl Default for AwsStorageConfig {
    fn default() -> Self {
        Self {
            region: String::from("us-east-1"),
            table_name: String::from("fragments"),
            bucket: String::from("fragments"),
            dynamodb_endpoint_url: None,
            s3_endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl AwsStorageConfig {
    /// Set the `DynamoDB` table name.
    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Set the S3 bucket name.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Point both clients at local emulators.
    ///
    /// Enables path-style addressing, which S3 emulators expect.
    #[must_use]
    pub fn with_local_endpoints(
        mut self,
        dynamodb: impl Into<String>,
        s3: impl Into<String>,
    ) -> Self {
        self.dynamodb_endpoint_url = Some(dynamodb.into());
        self.s3_endpoint_url = Some(s3.into());
        self.force_path_style = true;
        self
    }
}
