use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use shipreg_types::ContentId;
use tracing::debug;

use crate::config::DocumentStoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Document store backed by the IPFS HTTP API.
///
/// Works against a local node or a pinning service exposing `/api/v0/add`.
pub struct IpfsHttpDocumentStore {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl IpfsHttpDocumentStore {
    /// Build with the configured request timeout. Timeouts surface as
    /// [`StoreError::Unavailable`].
    pub fn new(config: &DocumentStoreConfig) -> StoreResult<Self> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &DocumentStoreConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        }
    }
}

#[async_trait]
impl DocumentStore for IpfsHttpDocumentStore {
    async fn upload(&self, payload: Bytes) -> StoreResult<ContentId> {
        let url = format!("{}/api/v0/add", self.api_url);
        let form = Form::new().part("file", Part::bytes(payload.to_vec()).file_name("document"));

        let mut request = self.http.post(&url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!("POST {url}: HTTP {status}")));
        }

        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        debug!(cid = %body.hash, "ipfs add completed");
        ContentId::new(body.hash).map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}
