use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use shipreg_types::ContentId;
use tracing::{debug, info};

use crate::config::DocumentStoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub content_id: ContentId,
    pub gateway_url: String,
}

/// Check a payload against the size policy without uploading it.
pub fn check_payload(payload: &[u8], max_size_bytes: usize) -> StoreResult<()> {
    if payload.is_empty() {
        return Err(StoreError::EmptyPayload);
    }
    if payload.len() > max_size_bytes {
        return Err(StoreError::PayloadTooLarge {
            size: payload.len(),
            max: max_size_bytes,
        });
    }
    Ok(())
}

/// Size policy and URL derivation in front of a [`DocumentStore`].
pub struct DocumentStoreAdapter {
    store: Arc<dyn DocumentStore>,
    gateway_url_template: String,
    max_upload_bytes: usize,
}

impl DocumentStoreAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, config: &DocumentStoreConfig) -> Self {
        Self {
            store,
            gateway_url_template: config.gateway_url_template.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Configured upload limit.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Upload `payload` if it is non-empty and at most `max_size_bytes`.
    ///
    /// Rejected payloads never reach the store.
    pub async fn upload(&self, payload: Bytes, max_size_bytes: usize) -> StoreResult<UploadedDocument> {
        check_payload(&payload, max_size_bytes)?;
        let size = payload.len();
        debug!(size, "uploading document");

        let content_id = self.store.upload(payload).await?;
        let gateway_url = self.gateway_url(&content_id);
        info!(cid = %content_id, size, "document uploaded");
        Ok(UploadedDocument {
            content_id,
            gateway_url,
        })
    }

    /// Display URL for `content_id`. Pure; no network access.
    pub fn gateway_url(&self, content_id: &ContentId) -> String {
        self.gateway_url_template.replace("{cid}", content_id.as_str())
    }
}
