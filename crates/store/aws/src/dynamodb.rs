use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::error;

use fragments_core::FragmentRecord;
use fragments_store::error::StoreError;
use fragments_store::key::FragmentKey;
use fragments_store::listing::FragmentListing;
use fragments_store::store::MetadataStore;

use crate::item::{ID, OWNER_ID, item_to_record, listing_from_items, record_to_item};

/// DynamoDB-backed implementation of [`MetadataStore`].
///
/// One item per fragment in a table keyed by (`ownerId`, `id`), so an owner's
/// listing is a single-partition `Query`.
pub struct DynamoMetadataStore {
    client: Client,
    table_name: String,
}

impl DynamoMetadataStore {
    /// Create a store from an existing `DynamoDB` client.
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn backend_error(
        &self,
        op: &str,
        owner_id: &str,
        id: Option<&str>,
        err: impl std::fmt::Display,
    ) -> StoreError {
        let err_str = err.to_string();
        error!(
            table = %self.table_name,
            owner_id = %owner_id,
            id = ?id,
            error = %err_str,
            "DynamoDB {op} failed"
        );
        StoreError::Backend(format!(
            "DynamoDB {op} failed on {}: {err_str}",
            self.table_name
        ))
    }

    fn key_attributes(key: &FragmentKey) -> [(String, AttributeValue); 2] {
        [
            (OWNER_ID.to_owned(), AttributeValue::S(key.owner_id.clone())),
            (ID.to_owned(), AttributeValue::S(key.id.clone())),
        ]
    }

    /// Run a paginated `Query` over one owner's partition.
    async fn query_owner(
        &self,
        owner_id: &str,
        ids_only: bool,
    ) -> Result<Vec<HashMap<String, AttributeValue>>, StoreError> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#owner = :owner")
                .expression_attribute_names("#owner", OWNER_ID)
                .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_owned()))
                .set_exclusive_start_key(exclusive_start_key);

            if ids_only {
                query = query
                    .projection_expression("#id")
                    .expression_attribute_names("#id", ID);
            }

            let resp = query
                .send()
                .await
                .map_err(|e| self.backend_error("query", owner_id, None, e))?;

            items.extend(resp.items().iter().cloned());

            exclusive_start_key = resp.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

impl std::fmt::Debug for DynamoMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoMetadataStore")
            .field("table_name", &self.table_name)
            .field("client", &"<DynamoDbClient>")
            .finish()
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn write(&self, record: &FragmentRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| self.backend_error("put_item", &record.owner_id, Some(&record.id), e))?;
        Ok(())
    }

    async fn read(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(HashMap::from(Self::key_attributes(key))))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| self.backend_error("get_item", &key.owner_id, Some(&key.id), e))?;

        result.item().map(item_to_record).transpose()
    }

    async fn list(&self, owner_id: &str, expand: bool) -> Result<FragmentListing, StoreError> {
        let items = self.query_owner(owner_id, !expand).await?;
        Ok(listing_from_items(owner_id, &items, expand))
    }

    async fn delete(&self, key: &FragmentKey) -> Result<bool, StoreError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(HashMap::from(Self::key_attributes(key))))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| self.backend_error("delete_item", &key.owner_id, Some(&key.id), e))?;

        Ok(result.attributes().is_some_and(|old| !old.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::config::retry::RetryConfig;
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};

    use super::*;

    /// A store whose endpoint refuses connections and never retries.
    fn unreachable_store() -> DynamoMetadataStore {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
            .endpoint_url("http://127.0.0.1:1")
            .retry_config(RetryConfig::disabled())
            .build();
        DynamoMetadataStore::from_client(Client::from_conf(config), "fragments")
    }

    #[test]
    fn backend_error_names_the_operation_and_table() {
        let store = unreachable_store();
        let err = store.backend_error("put_item", "owner", Some("id"), "throttled");
        let StoreError::Backend(message) = err else {
            panic!("expected a backend error");
        };
        assert_eq!(message, "DynamoDB put_item failed on fragments: throttled");
    }

    #[tokio::test]
    async fn sdk_failures_become_backend_errors() {
        let store = unreachable_store();
        let key = FragmentKey::new("owner", "id");

        let err = store.read(&key).await.unwrap_err();
        assert!(
            matches!(&err, StoreError::Backend(m) if m.starts_with("DynamoDB get_item failed on fragments")),
            "unexpected error: {err}"
        );

        let err = store.list("owner", true).await.unwrap_err();
        assert!(matches!(&err, StoreError::Backend(m) if m.starts_with("DynamoDB query failed")));
    }
}
