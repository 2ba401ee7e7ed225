use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shipreg_types::{IndexRecord, ShipmentId};
use tracing::debug;

use crate::config::IndexStoreConfig;
use crate::error::{IndexError, IndexResult};
use crate::traits::IndexStore;

/// Index backed by a realtime-database REST endpoint.
///
/// Entries live at `<database_url>/shipments/<id>.json`. A missing entry
/// reads back as JSON `null`. An entry without an `id` field takes the id
/// from its key.
pub struct RealtimeDbIndexStore {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RealtimeDbIndexStore {
    pub fn new(config: &IndexStoreConfig) -> IndexResult<Self> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &IndexStoreConfig) -> Self {
        Self {
            http,
            base_url: config.database_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn entry_url(&self, id: ShipmentId) -> String {
        format!("{}/shipments/{id}.json", self.base_url)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }
}

#[async_trait]
impl IndexStore for RealtimeDbIndexStore {
    async fn read(&self, id: ShipmentId) -> IndexResult<Option<IndexRecord>> {
        let url = self.entry_url(id);
        let response = self.with_auth(self.http.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Unavailable(format!("GET {url}: HTTP {status}")));
        }
        let mut value: Value = response.json().await?;
        if value.is_null() {
            debug!(id = %id, "index entry absent");
            return Ok(None);
        }
        if let Some(entry) = value.as_object_mut() {
            entry.entry("id").or_insert_with(|| json!(id.get()));
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| IndexError::Malformed {
                id,
                reason: e.to_string(),
            })
    }

    async fn write(&self, id: ShipmentId, record: &IndexRecord) -> IndexResult<()> {
        let url = self.entry_url(id);
        let body =
            serde_json::to_value(record).map_err(|e| IndexError::Serialization(e.to_string()))?;
        let response = self.with_auth(self.http.put(&url)).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Unavailable(format!("PUT {url}: HTTP {status}")));
        }
        debug!(id = %id, "index entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use shipreg_types::{ErrorKind, ShipmentStatus};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer, token: Option<&str>) -> RealtimeDbIndexStore {
        RealtimeDbIndexStore::new(&IndexStoreConfig {
            database_url: server.uri(),
            auth_token: token.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    fn record() -> IndexRecord {
        IndexRecord {
            id: ShipmentId::new(77).unwrap(),
            source: "Durban".into(),
            destination: "Perth".into(),
            receiver_address_text: "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".into(),
            expiry_days: Some(14),
            description: "Wool | Durban -> Perth".into(),
            document_content_id: "bafkwool".into(),
            document_url: "https://gateway.pinata.cloud/ipfs/bafkwool".into(),
            transaction_ref: format!("0x{}", "ef".repeat(32)),
            owner_address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap()),
            status: ShipmentStatus::InTransit,
        }
    }

    #[tokio::test]
    async fn null_reads_as_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shipments/77.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
            .mount(&server)
            .await;

        let got = store(&server, None).read(ShipmentId::new(77).unwrap()).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn read_decodes_record_with_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shipments/77.json"))
            .and(query_param("auth", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::to_value(record()).unwrap()))
            .mount(&server)
            .await;

        let got = store(&server, Some("tok"))
            .read(ShipmentId::new(77).unwrap())
            .await
            .unwrap();
        assert_eq!(got, Some(record()));
    }

    #[tokio::test]
    async fn entry_without_status_defaults_to_pending() {
        let server = MockServer::start().await;
        let mut body = serde_json::to_value(record()).unwrap();
        body.as_object_mut().unwrap().remove("status");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let got = store(&server, None)
            .read(ShipmentId::new(77).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.status, ShipmentStatus::Pending);
    }

    #[tokio::test]
    async fn legacy_entry_takes_id_from_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shipments/5.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "source": "Pune",
                "destination": "Nagpur",
                "documentUrl": "https://gateway.pinata.cloud/ipfs/bafkold",
                "timestamp": "2024-09-14T10:00:00.000Z"
            })))
            .mount(&server)
            .await;

        let got = store(&server, None)
            .read(ShipmentId::new(5).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.id, ShipmentId::new(5).unwrap());
        assert_eq!(got.destination, "Nagpur");
        assert!(got.created_at.is_some());
        assert!(got.transaction_ref.is_empty());
    }

    #[tokio::test]
    async fn write_puts_full_record() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/shipments/77.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let r = record();
        store(&server, None).write(r.id, &r).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["receiverAddressText"], r.receiver_address_text);
        assert_eq!(sent["status"], "IN_TRANSIT");
    }

    #[tokio::test]
    async fn hand_edited_garbage_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"source": 5})))
            .mount(&server)
            .await;

        let err = store(&server, None)
            .read(ShipmentId::new(77).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Malformed { .. }));
    }

    #[tokio::test]
    async fn http_failure_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let r = record();
        let err = store(&server, None).write(r.id, &r).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientIo);
    }
}
