use bytes::Bytes;
use tracing::{debug, info, instrument};

use fragments_convert::{Converted, RequestedId, convert};
use fragments_core::{APPLICATION_JSON, FragmentRecord, MediaType, normalize_content_type};
use fragments_store::{FragmentListing, Storage};

use crate::error::FragmentError;
use crate::fragment::Fragment;

/// Largest body accepted on creation unless configured otherwise (5 MiB).
pub const DEFAULT_MAX_FRAGMENT_SIZE: usize = 5 * 1024 * 1024;

/// The fragment operations offered to the HTTP layer.
///
/// Holds the storage handle chosen at start-up; cloning is cheap.
#[derive(Debug, Clone)]
pub struct FragmentService {
    storage: Storage,
    max_fragment_size: usize,
}

impl FragmentService {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            max_fragment_size: DEFAULT_MAX_FRAGMENT_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_fragment_size(mut self, max_fragment_size: usize) -> Self {
        self.max_fragment_size = max_fragment_size;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn max_fragment_size(&self) -> usize {
        self.max_fragment_size
    }

    /// Validate and store a new fragment.
    ///
    /// Every check runs before the first storage write, so a rejected request
    /// leaves nothing behind.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn create_fragment(
        &self,
        owner_id: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<FragmentRecord, FragmentError> {
        let content_type = normalize_content_type(content_type)?;

        if data.is_empty() {
            return Err(FragmentError::EmptyBody);
        }
        if data.len() > self.max_fragment_size {
            return Err(FragmentError::TooLarge {
                size: data.len(),
                max: self.max_fragment_size,
            });
        }
        let media = MediaType::parse(&content_type)?;
        if media.essence() == APPLICATION_JSON {
            serde_json::from_slice::<serde_json::Value>(&data)
                .map_err(|e| FragmentError::InvalidContent(format!("invalid JSON: {e}")))?;
        }

        let mut fragment = Fragment::new(self.storage.clone(), owner_id, &content_type)?;
        fragment.set_data(data).await?;

        info!(id = %fragment.id(), content_type = %content_type, "created fragment");
        Ok(fragment.into_record())
    }

    /// Fetch a fragment's bytes, converted when `raw_id` carries an extension.
    ///
    /// The fragment is looked up before the extension is resolved, so a
    /// missing fragment is reported as not found whatever was requested.
    #[instrument(skip(self))]
    pub async fn get_fragment_by_id(
        &self,
        owner_id: &str,
        raw_id: &str,
    ) -> Result<Converted, FragmentError> {
        let requested = RequestedId::parse(raw_id);
        let fragment = Fragment::by_id(&self.storage, owner_id, requested.id).await?;
        let target = requested.target_type()?;
        let data = fragment.data().await?;

        let Some(target) = target else {
            return Ok(Converted {
                data,
                content_type: fragment.content_type().to_owned(),
            });
        };

        debug!(id = %fragment.id(), from = %fragment.content_type(), to = %target, "negotiated conversion");
        Ok(convert(data, fragment.content_type(), target)?)
    }

    #[instrument(skip(self))]
    pub async fn get_fragment_info(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<FragmentRecord, FragmentError> {
        Ok(Fragment::by_id(&self.storage, owner_id, id).await?.into_record())
    }

    #[instrument(skip(self))]
    pub async fn list_fragments(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, FragmentError> {
        Fragment::by_owner(&self.storage, owner_id, expand).await
    }

    /// Replace a fragment's bytes, keeping its type.
    ///
    /// `declared_type` must equal the stored type exactly.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn replace_fragment_data(
        &self,
        owner_id: &str,
        id: &str,
        data: Bytes,
        declared_type: &str,
    ) -> Result<FragmentRecord, FragmentError> {
        let mut fragment = Fragment::by_id(&self.storage, owner_id, id).await?;

        if declared_type.trim() != fragment.content_type() {
            return Err(FragmentError::TypeMismatch {
                expected: fragment.content_type().to_owned(),
                actual: declared_type.to_owned(),
            });
        }
        if data.is_empty() {
            return Err(FragmentError::EmptyBody);
        }

        fragment.set_data(data).await?;
        info!(id = %fragment.id(), size = fragment.size(), "replaced fragment data");
        Ok(fragment.into_record())
    }

    #[instrument(skip(self))]
    pub async fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<(), FragmentError> {
        Fragment::by_id(&self.storage, owner_id, id).await?;
        Fragment::delete(&self.storage, owner_id, id).await?;
        info!(id = %id, "deleted fragment");
        Ok(())
    }
}
