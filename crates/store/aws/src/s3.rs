use std::pin::pin;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::{ByteStream, ByteStreamError};
use bytes::Bytes;
use futures::stream;
use tracing::{debug, error};

use fragments_store::buffer::collect_chunks;
use fragments_store::error::StoreError;
use fragments_store::key::FragmentKey;
use fragments_store::store::BlobStore;

/// S3-backed implementation of [`BlobStore`].
///
/// Each fragment is one object at `{owner_id}/{id}` in a single bucket.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a store from an existing S3 client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Log an SDK failure with its location and turn it into a backend error.
    fn backend_error(&self, op: &str, key: &str, err: impl std::fmt::Display) -> StoreError {
        let err_str = err.to_string();
        error!(bucket = %self.bucket, key = %key, error = %err_str, "S3 {op} failed");
        StoreError::Backend(format!("S3 {op} failed for {}/{key}: {err_str}", self.bucket))
    }
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("bucket", &self.bucket)
            .field("client", &"<S3Client>")
            .finish()
    }
}

/// Adapt the SDK body into a stream of chunks.
fn body_chunks(body: ByteStream) -> impl futures::Stream<Item = Result<Bytes, ByteStreamError>> {
    stream::try_unfold(body, |mut body| async move {
        let chunk = body.try_next().await?;
        Ok::<_, ByteStreamError>(chunk.map(|chunk| (chunk, body)))
    })
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn write(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError> {
        let object_key = key.object_key();
        debug!(bucket = %self.bucket, key = %object_key, size = data.len(), "uploading fragment data");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| self.backend_error("put_object", &object_key, e))?;
        Ok(())
    }

    async fn read(&self, key: &FragmentKey) -> Result<Option<Bytes>, StoreError> {
        let object_key = key.object_key();

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(self.backend_error("get_object", &object_key, service_err));
            }
        };

        let chunks = pin!(body_chunks(output.body));
        let data = collect_chunks(chunks).await?;
        debug!(bucket = %self.bucket, key = %object_key, size = data.len(), "downloaded fragment data");
        Ok(Some(data))
    }

    async fn delete(&self, key: &FragmentKey) -> Result<bool, StoreError> {
        let object_key = key.object_key();

        // DeleteObject succeeds for missing keys, so probe first.
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;
        if let Err(err) = head {
            let service_err = err.into_service_error();
            if service_err.is_not_found() {
                return Ok(false);
            }
            return Err(self.backend_error("head_object", &object_key, service_err));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| self.backend_error("delete_object", &object_key, e))?;
        Ok(true)
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use fragments_store::testing::run_blob_conformance_tests;

    use super::*;
    use crate::client::{build_s3_client, build_sdk_config};
    use crate::config::AwsStorageConfig;

    #[tokio::test]
    async fn conformance() {
        let endpoint = std::env::var("S3_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_owned());
        let config = AwsStorageConfig::default()
            .with_bucket(std::env::var("S3_BUCKET").unwrap_or_else(|_| "fragments-test".to_owned()))
            .with_local_endpoints("http://localhost:8000", endpoint);
        let sdk_config = build_sdk_config(&config).await;
        let client = build_s3_client(&sdk_config, &config);

        // The bucket may already exist from a previous run.
        let _ = client.create_bucket().bucket(&config.bucket).send().await;

        let store = S3BlobStore::from_client(client, &config.bucket);
        run_blob_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }
}
