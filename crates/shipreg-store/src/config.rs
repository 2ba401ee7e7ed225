use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Document store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStoreConfig {
    /// Display URL for a document. `{cid}` is replaced by the content id.
    pub gateway_url_template: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Base URL of the IPFS HTTP API.
    pub api_url: String,
    /// Bearer token for a pinning service, if it needs one.
    pub api_token: Option<String>,
    /// Per-request timeout for uploads.
    pub request_timeout_ms: u64,
}

impl DocumentStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            gateway_url_template: "https://gateway.pinata.cloud/ipfs/{cid}".into(),
            max_upload_bytes: 10 * 1024 * 1024,
            api_url: "http://127.0.0.1:5001".into(),
            api_token: None,
            request_timeout_ms: 60_000,
        }
    }
}
