//! Minimal JSON-RPC 2.0 transport.
//!
//! Shared by the identity provider and the ledger contract backend; both
//! talk to the same wallet / node endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The endpoint could not be reached or answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Server {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// The response did not have the expected shape.
    #[error("malformed rpc response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response {
    /// `null` is a valid result (a receipt that does not exist yet).
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC 2.0 client over HTTP.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Build with a request timeout. Timeouts surface as [`RpcError::Transport`].
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, url))
    }

    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one call and decode its `result`.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "json-rpc call");
        let response = self
            .http
            .post(&self.url)
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("{method}: HTTP {status}")));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;
        if let Some(err) = body.error {
            return Err(RpcError::Server {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        serde_json::from_value(body.result).map_err(|e| RpcError::Decode(format!("{method}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn decodes_result() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "eth_chainId"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": "0xaa36a7"})),
            )
            .mount(&mock)
            .await;

        let client = JsonRpcClient::new(mock.uri());
        let chain: String = client.call("eth_chainId", json!([])).await.unwrap();
        assert_eq!(chain, "0xaa36a7");
    }

    #[tokio::test]
    async fn surfaces_error_object() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32000, "message": "execution reverted: nope"}
            })))
            .mount(&mock)
            .await;

        let client = JsonRpcClient::new(mock.uri());
        let err = client.call::<_, Value>("eth_call", json!([])).await.unwrap_err();
        match err {
            RpcError::Server { code, message, .. } => {
                assert_eq!(code, -32000);
                assert!(message.contains("nope"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_result_decodes_as_none() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": null})),
            )
            .mount(&mock)
            .await;

        let client = JsonRpcClient::new(mock.uri());
        let receipt: Option<Value> = client
            .call("eth_getTransactionReceipt", json!(["0x00"]))
            .await
            .unwrap();
        assert!(receipt.is_none());
        let err = client.call::<_, String>("eth_chainId", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[tokio::test]
    async fn http_failure_is_transport_error() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock)
            .await;

        let client = JsonRpcClient::new(mock.uri());
        let err = client.call::<_, Value>("eth_accounts", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
