use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use fragments_core::{FragmentId, FragmentRecord};
use fragments_store::error::StoreError;
use fragments_store::listing::FragmentListing;

pub(crate) const OWNER_ID: &str = "ownerId";
pub(crate) const ID: &str = "id";
const CREATED: &str = "created";
const UPDATED: &str = "updated";
const TYPE: &str = "type";
const SIZE: &str = "size";

fn timestamp(value: DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Render a metadata record as a `DynamoDB` item.
pub(crate) fn record_to_item(record: &FragmentRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (OWNER_ID.to_owned(), AttributeValue::S(record.owner_id.clone())),
        (ID.to_owned(), AttributeValue::S(record.id.clone())),
        (CREATED.to_owned(), timestamp(record.created)),
        (UPDATED.to_owned(), timestamp(record.updated)),
        (TYPE.to_owned(), AttributeValue::S(record.content_type.clone())),
        (SIZE.to_owned(), AttributeValue::N(record.size.to_string())),
    ])
}

/// Parse a `DynamoDB` item back into a metadata record.
pub(crate) fn item_to_record(
    item: &HashMap<String, AttributeValue>,
) -> Result<FragmentRecord, StoreError> {
    let get_s = |key: &str| -> Result<String, StoreError> {
        match item.get(key) {
            Some(AttributeValue::S(v)) => Ok(v.clone()),
            _ => Err(StoreError::Serialization(format!(
                "missing or invalid string attribute: {key}"
            ))),
        }
    };

    let get_n_u64 = |key: &str| -> Result<u64, StoreError> {
        match item.get(key) {
            Some(AttributeValue::N(v)) => v
                .parse()
                .map_err(|_| StoreError::Serialization(format!("invalid number for {key}: {v}"))),
            _ => Err(StoreError::Serialization(format!(
                "missing or invalid number attribute: {key}"
            ))),
        }
    };

    let parse_datetime = |key: &str| -> Result<DateTime<Utc>, StoreError> {
        let s = get_s(key)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Serialization(format!("invalid datetime for {key}: {e}")))
    };

    Ok(FragmentRecord {
        id: get_s(ID)?,
        owner_id: get_s(OWNER_ID)?,
        created: parse_datetime(CREATED)?,
        updated: parse_datetime(UPDATED)?,
        content_type: get_s(TYPE)?,
        size: get_n_u64(SIZE)?,
    })
}

/// Extract only the fragment id from a projected item.
pub(crate) fn item_to_id(item: &HashMap<String, AttributeValue>) -> Result<String, StoreError> {
    match item.get(ID) {
        Some(AttributeValue::S(v)) => Ok(v.clone()),
        _ => Err(StoreError::Serialization(format!(
            "missing or invalid string attribute: {ID}"
        ))),
    }
}

/// Build an owner's listing from queried items.
///
/// Items that fail to parse are logged and left out; one bad item never fails
/// the whole listing.
pub(crate) fn listing_from_items(
    owner_id: &str,
    items: &[HashMap<String, AttributeValue>],
    expand: bool,
) -> FragmentListing {
    let skip = |e: StoreError| {
        warn!(error = %e, owner_id = %owner_id, "skipping malformed fragment record");
    };

    if expand {
        let records: Vec<FragmentRecord> = items
            .iter()
            .filter_map(|item| item_to_record(item).map_err(skip).ok())
            .collect();
        return FragmentListing::Expanded(records);
    }

    let ids: Vec<FragmentId> = items
        .iter()
        .filter_map(|item| item_to_id(item).map_err(skip).ok())
        .collect();
    FragmentListing::Ids(ids)
}
