use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use shipreg_index::{IndexError, IndexStore};
use shipreg_ledger::{LedgerClient, LedgerError};
use shipreg_session::ConnectionSession;
use shipreg_store::{check_payload, DocumentStoreAdapter, UploadedDocument};
use shipreg_types::{
    AccountAddress, IndexRecord, LedgerRecord, ReconciledView, ShipmentId, ShipmentStatus,
};
use tracing::{info, warn};

use crate::config::SynchronizerConfig;
use crate::error::{SyncError, SyncResult};
use crate::reconcile::{explorer_url, reconcile, LedgerRead};
use crate::request::CreateShipmentRequest;
use crate::state::{CreationMachine, CreationState};
use crate::types::{ClaimedDocument, CreateOutcome, CreateStatus, ReplaceOutcome};

/// Coordinates the ledger, the document store and the index.
///
/// Creation flows one way (document, then ledger, then index); reads fan in
/// from the index and the ledger concurrently. The ledger is the source of
/// truth: a failed ledger write never produces an index entry, and a failed
/// index write after a ledger success is reported as a partial success, not
/// an error.
pub struct RegistrySynchronizer {
    session: Arc<ConnectionSession>,
    ledger: Arc<LedgerClient>,
    documents: Arc<DocumentStoreAdapter>,
    index: Arc<dyn IndexStore>,
    config: SynchronizerConfig,
    contract: Option<AccountAddress>,
}

impl RegistrySynchronizer {
    pub fn new(
        session: Arc<ConnectionSession>,
        ledger: Arc<LedgerClient>,
        documents: Arc<DocumentStoreAdapter>,
        index: Arc<dyn IndexStore>,
        config: SynchronizerConfig,
    ) -> Self {
        Self {
            session,
            ledger,
            documents,
            index,
            config,
            contract: None,
        }
    }

    /// Contract address used for explorer links in returned views.
    pub fn with_contract_address(mut self, contract: AccountAddress) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn session(&self) -> &Arc<ConnectionSession> {
        &self.session
    }

    fn explorer_url(&self, id: ShipmentId) -> Option<String> {
        self.contract
            .map(|contract| explorer_url(&self.config.explorer_url_template, contract, id))
    }

    /// Read the index entry stored under `id`. An entry naming a different
    /// shipment is malformed, not a lookup result.
    async fn read_index(&self, id: ShipmentId) -> SyncResult<Option<IndexRecord>> {
        let record = self.index.read(id).await?;
        keyed(id, record)
    }

    fn view(&self, index: IndexRecord, ledger: LedgerRead) -> ReconciledView {
        let explorer = self.explorer_url(index.id);
        reconcile(index, ledger, |cid| self.documents.gateway_url(cid), explorer)
    }

    /// Register a new shipment.
    ///
    /// Input is validated in one pass and the signing identity is checked
    /// before anything is uploaded. Errors returned from here mean the ledger
    /// holds no new record; an uploaded document may be left orphaned, and
    /// the caller may retry under the same identifier.
    pub async fn create_shipment(&self, request: &CreateShipmentRequest) -> SyncResult<CreateOutcome> {
        let max_upload = self.documents.max_upload_bytes();
        let valid = request.validate(&self.config, max_upload)?;
        let owner = self.session.require_identity()?;
        let id = valid.id;
        let mut machine = CreationMachine::new();

        machine.advance(CreationState::DocumentUploading)?;
        let document = match self.documents.upload(valid.payload.clone(), max_upload).await {
            Ok(document) => document,
            Err(e) => {
                machine.advance(CreationState::Failed)?;
                warn!(id = %id, error = %e, "document upload failed");
                return Err(e.into());
            }
        };

        machine.advance(CreationState::LedgerSubmitting)?;
        let description = valid.ledger_description();
        let tx = match self
            .ledger
            .create_record(id, &description, valid.receiver, &document.content_id)
            .await
        {
            Ok(tx) => tx,
            Err(e) => {
                machine.advance(CreationState::Failed)?;
                warn!(id = %id, cid = %document.content_id, error = %e, "ledger create failed, uploaded document is orphaned");
                return Err(e.into());
            }
        };
        machine.advance(CreationState::LedgerConfirmed)?;
        info!(id = %id, tx = %tx, "shipment recorded on ledger");

        let record = IndexRecord {
            id,
            source: valid.source.clone(),
            destination: valid.destination.clone(),
            receiver_address_text: valid.receiver.to_string(),
            expiry_days: valid.expiry_days,
            description: description.clone(),
            document_content_id: document.content_id.to_string(),
            document_url: document.gateway_url.clone(),
            transaction_ref: tx.to_string(),
            owner_address: owner.to_string(),
            created_at: Some(Utc::now()),
            status: ShipmentStatus::default(),
        };

        machine.advance(CreationState::IndexWriting)?;
        let status = match self.index.write(id, &record).await {
            Ok(()) => {
                machine.advance(CreationState::Done)?;
                CreateStatus::Complete
            }
            Err(e) => {
                machine.advance(CreationState::PartialSuccess)?;
                warn!(id = %id, error = %e, "index write failed after ledger success; index is stale");
                CreateStatus::PartialSuccess {
                    cause: e.to_string(),
                    pending: record.clone(),
                }
            }
        };

        let submitted = LedgerRecord {
            id,
            description,
            sender: owner,
            receiver: valid.receiver,
            content_id: document.content_id,
        };
        Ok(CreateOutcome {
            view: self.view(record, LedgerRead::Read(submitted)),
            trace: machine.into_trace(),
            status,
        })
    }

    /// Write an index record again after a partial success.
    pub async fn retry_index_write(&self, record: &IndexRecord) -> SyncResult<()> {
        self.index.write(record.id, record).await?;
        info!(id = %record.id, "index entry rewritten");
        Ok(())
    }

    /// Look a shipment up, reading the ledger only if an identity is held.
    pub async fn fetch_shipment(&self, raw_id: &str) -> SyncResult<ReconciledView> {
        let connected = self.session.is_connected();
        self.fetch_shipment_with(raw_id, connected).await
    }

    /// Look a shipment up. The index and (when `connected`) the ledger are
    /// read concurrently; a missing index entry is `NotFound` whatever the
    /// ledger says.
    pub async fn fetch_shipment_with(&self, raw_id: &str, connected: bool) -> SyncResult<ReconciledView> {
        let id = ShipmentId::parse(raw_id)?;

        let ledger_read = async {
            if !connected {
                return LedgerRead::Skipped;
            }
            match self.ledger.read_record(id).await {
                Ok(record) => LedgerRead::Read(record),
                Err(e) => LedgerRead::Failed(e),
            }
        };
        let (index, ledger) = tokio::join!(self.index.read(id), ledger_read);

        let index = keyed(id, index?)?.ok_or(SyncError::NotFound(id))?;
        match &ledger {
            LedgerRead::Failed(LedgerError::RecordNotFound(_)) => {
                warn!(id = %id, "index entry has no ledger record");
            }
            LedgerRead::Failed(e) => warn!(id = %id, error = %e, "ledger read failed, returning unconfirmed view"),
            _ => {}
        }
        Ok(self.view(index, ledger))
    }

    /// Point a shipment at a new document.
    ///
    /// Only the record's sender can do this; the ledger enforces it. The
    /// index refresh afterwards is best effort.
    pub async fn replace_document(&self, raw_id: &str, payload: Bytes) -> SyncResult<ReplaceOutcome> {
        let max_upload = self.documents.max_upload_bytes();
        let mut problems = Vec::new();
        let id = ShipmentId::parse(raw_id)
            .map_err(|e| problems.push(e.to_string()))
            .ok();
        if let Err(e) = check_payload(&payload, max_upload) {
            problems.push(e.to_string());
        }
        let id = match id {
            Some(id) if problems.is_empty() => id,
            _ => return Err(SyncError::InvalidInput(problems)),
        };
        self.session.require_identity()?;

        let document = self.documents.upload(payload, max_upload).await?;
        let tx = self.ledger.upload_document(id, &document.content_id).await?;
        info!(id = %id, cid = %document.content_id, tx = %tx, "shipment document replaced");

        let index_warning = match self.refresh_document(id, &document).await {
            Ok(()) => None,
            Err(e) => {
                warn!(id = %id, error = %e, "index not refreshed after document replacement");
                Some(e.to_string())
            }
        };
        Ok(ReplaceOutcome {
            id,
            transaction_ref: tx,
            document,
            index_warning,
        })
    }

    async fn refresh_document(&self, id: ShipmentId, document: &UploadedDocument) -> SyncResult<()> {
        let mut record = self.read_index(id).await?.ok_or(SyncError::NotFound(id))?;
        record.document_content_id = document.content_id.to_string();
        record.document_url = document.gateway_url.clone();
        self.index.write(id, &record).await?;
        Ok(())
    }

    /// Set the lifecycle status kept in the index. Last writer wins.
    pub async fn update_status(&self, raw_id: &str, status: ShipmentStatus) -> SyncResult<IndexRecord> {
        let id = ShipmentId::parse(raw_id)?;
        let mut record = self.read_index(id).await?.ok_or(SyncError::NotFound(id))?;
        record.status = status;
        self.index.write(id, &record).await?;
        info!(id = %id, status = %status, "shipment status updated");
        Ok(record)
    }

    /// Release a shipment's document to its receiver.
    ///
    /// Requires a signed-in user and a connected identity equal to the
    /// ledger's receiver for the shipment.
    pub async fn claim_document(&self, raw_id: &str, signed_in: bool) -> SyncResult<ClaimedDocument> {
        let id = ShipmentId::parse(raw_id)?;
        if !signed_in {
            return Err(SyncError::Unauthorized("sign in to claim documents".into()));
        }
        let caller = self.session.require_identity()?;

        let record = self.ledger.read_record(id).await?;
        if record.receiver != caller {
            warn!(id = %id, caller = %caller, "claim by someone other than the receiver");
            return Err(SyncError::Unauthorized(format!(
                "{} is not the receiver of shipment {id}",
                caller.short()
            )));
        }
        info!(id = %id, receiver = %caller, "document claimed");
        Ok(ClaimedDocument {
            id,
            receiver: caller,
            document_url: self.documents.gateway_url(&record.content_id),
            content_id: record.content_id,
        })
    }
}

fn keyed(id: ShipmentId, record: Option<IndexRecord>) -> SyncResult<Option<IndexRecord>> {
    match record {
        Some(r) if r.id != id => Err(IndexError::Malformed {
            id,
            reason: format!("entry names shipment {}", r.id),
        }
        .into()),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipreg_index::InMemoryIndexStore;
    use shipreg_ledger::{FeePolicy, InMemoryShipmentContract};
    use shipreg_session::{SessionConfig, StaticIdentityProvider};
    use shipreg_store::{DocumentStoreConfig, InMemoryDocumentStore};
    use shipreg_types::{ContentId, ErrorKind};

    const SENDER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const RECEIVER: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const CONTRACT: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn addr(s: &str) -> AccountAddress {
        AccountAddress::parse(s).unwrap()
    }

    struct Harness {
        session: Arc<ConnectionSession>,
        contract: Arc<InMemoryShipmentContract>,
        documents: Arc<InMemoryDocumentStore>,
        index: Arc<InMemoryIndexStore>,
        sync: RegistrySynchronizer,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_max_upload(1024)
        }

        fn with_max_upload(max_upload_bytes: usize) -> Self {
            let provider = Arc::new(StaticIdentityProvider::authorized(vec![addr(SENDER)]));
            let session = Arc::new(ConnectionSession::new(provider, &SessionConfig::default()));
            let contract = Arc::new(InMemoryShipmentContract::new());
            let documents = Arc::new(InMemoryDocumentStore::new());
            let index = Arc::new(InMemoryIndexStore::new());

            let ledger = Arc::new(LedgerClient::new(
                session.clone(),
                contract.clone(),
                FeePolicy::default(),
            ));
            let adapter = Arc::new(DocumentStoreAdapter::new(
                documents.clone(),
                &DocumentStoreConfig {
                    max_upload_bytes,
                    ..Default::default()
                },
            ));
            let sync = RegistrySynchronizer::new(
                session.clone(),
                ledger,
                adapter,
                index.clone(),
                SynchronizerConfig::default(),
            )
            .with_contract_address(addr(CONTRACT));

            Self {
                session,
                contract,
                documents,
                index,
                sync,
            }
        }

        async fn connected() -> Self {
            let h = Self::new();
            h.session.connect().await.unwrap();
            h
        }

        fn network_calls(&self) -> usize {
            self.contract.estimate_calls()
                + self.contract.send_calls()
                + self.contract.read_calls()
                + self.documents.upload_calls()
                + self.index.read_calls()
                + self.index.write_calls()
        }
    }

    fn request(id: &str) -> CreateShipmentRequest {
        CreateShipmentRequest {
            id: id.into(),
            source: "Antwerp".into(),
            destination: "Montreal".into(),
            contents: "Lab reagents".into(),
            receiver_address: RECEIVER.to_lowercase(),
            expiry_days: Some(21),
            payload: Bytes::from_static(b"certificate of origin"),
        }
    }

    #[tokio::test]
    async fn invalid_identifiers_make_no_network_calls() {
        let h = Harness::connected().await;
        for bad in ["0", "-1", "abc", "", "1.5", "99999999999999999999999"] {
            let err = h.sync.create_shipment(&request(bad)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "create {bad:?}");
            let err = h.sync.fetch_shipment(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "fetch {bad:?}");
        }
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn create_then_fetch_returns_submitted_ledger_fields() {
        let h = Harness::connected().await;
        let outcome = h.sync.create_shipment(&request("17")).await.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(
            outcome.trace,
            vec![
                CreationState::Idle,
                CreationState::DocumentUploading,
                CreationState::LedgerSubmitting,
                CreationState::LedgerConfirmed,
                CreationState::IndexWriting,
                CreationState::Done,
            ]
        );

        let view = h.sync.fetch_shipment("17").await.unwrap();
        assert!(view.ledger_confirmed);
        assert_eq!(view.description, "Lab reagents | Antwerp -> Montreal");
        assert_eq!(view.sender, Some(addr(SENDER)));
        assert_eq!(view.receiver, Some(addr(RECEIVER)));
        assert_eq!(view.content_id, outcome.view.content_id);
        assert_eq!(view.source, "Antwerp");
        assert_eq!(view.expiry_days, Some(21));
        assert_eq!(view.status, ShipmentStatus::Pending);
        assert_eq!(
            view.explorer_url.as_deref(),
            Some(format!("https://sepolia.etherscan.io/token/{CONTRACT}/token/17").as_str())
        );

        let stored = h.index.get(ShipmentId::new(17).unwrap()).unwrap();
        assert_eq!(stored.receiver_address_text, RECEIVER);
        assert_eq!(stored.owner_address, SENDER);
        assert_eq!(Some(stored.transaction_ref), view.transaction_ref);
    }

    #[tokio::test]
    async fn index_failure_is_partial_success_and_ledger_stays_truth() {
        let h = Harness::connected().await;
        let id = ShipmentId::new(5).unwrap();
        // A stale, hand-edited entry already sits under the identifier.
        h.index.insert(IndexRecord {
            id,
            source: "Antwerp".into(),
            destination: "Montreal".into(),
            receiver_address_text: SENDER.into(),
            expiry_days: None,
            description: "tampered".into(),
            document_content_id: "bafkold".into(),
            document_url: String::new(),
            transaction_ref: String::new(),
            owner_address: RECEIVER.into(),
            created_at: Some(Utc::now()),
            status: ShipmentStatus::Delivered,
        });
        h.index.set_fail_writes(true);

        let outcome = h.sync.create_shipment(&request("5")).await.unwrap();
        assert_eq!(outcome.warning_kind(), Some(ErrorKind::PartialSuccess));
        assert_eq!(outcome.trace.last(), Some(&CreationState::PartialSuccess));
        let pending = match &outcome.status {
            CreateStatus::PartialSuccess { pending, .. } => pending.clone(),
            CreateStatus::Complete => panic!("expected partial success"),
        };

        let view = h.sync.fetch_shipment("5").await.unwrap();
        assert!(view.ledger_confirmed);
        assert_eq!(view.description, "Lab reagents | Antwerp -> Montreal");
        assert_eq!(view.sender, Some(addr(SENDER)));
        assert_eq!(view.receiver, Some(addr(RECEIVER)));
        assert_eq!(view.content_id, outcome.view.content_id);

        h.index.set_fail_writes(false);
        h.sync.retry_index_write(&pending).await.unwrap();
        h.sync.retry_index_write(&pending).await.unwrap();
        assert_eq!(h.index.get(id), Some(pending));
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected_before_upload() {
        let h = Harness::with_max_upload(8);
        h.session.connect().await.unwrap();
        let err = h.sync.create_shipment(&request("3")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(h.documents.upload_calls(), 0);
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn create_without_identity_touches_nothing() {
        let h = Harness::new();
        let err = h.sync.create_shipment(&request("3")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
        assert_eq!(h.network_calls(), 0);
    }

    #[tokio::test]
    async fn ledger_rejection_writes_no_index_entry() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("8")).await.unwrap();
        let writes = h.index.write_calls();

        let mut again = request("8");
        again.contents = "Duplicate".into();
        let err = h.sync.create_shipment(&again).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SubmissionRejected);
        assert_eq!(h.index.write_calls(), writes);
        assert_eq!(h.documents.upload_calls(), 2);
        let stored = h.index.get(ShipmentId::new(8).unwrap()).unwrap();
        assert_eq!(stored.description, "Lab reagents | Antwerp -> Montreal");
    }

    #[tokio::test]
    async fn upload_failure_stops_before_ledger() {
        let h = Harness::connected().await;
        h.documents.set_fail_uploads(true);
        let err = h.sync.create_shipment(&request("8")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientIo);
        assert_eq!(h.contract.send_calls(), 0);
        assert_eq!(h.index.write_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_without_identity_skips_ledger() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("11")).await.unwrap();
        h.session.disconnect();
        let reads = h.contract.read_calls();

        let view = h.sync.fetch_shipment("11").await.unwrap();
        assert!(!view.ledger_confirmed);
        assert!(view.ledger_error.is_none());
        assert_eq!(view.source, "Antwerp");
        assert_eq!(h.contract.read_calls(), reads);
    }

    #[tokio::test]
    async fn fetch_survives_ledger_failure() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("12")).await.unwrap();
        h.contract.set_fail_reads(true);

        let view = h.sync.fetch_shipment("12").await.unwrap();
        assert!(!view.ledger_confirmed);
        assert!(view.ledger_error.is_some());
        assert_eq!(view.description, "Lab reagents | Antwerp -> Montreal");
    }

    #[tokio::test]
    async fn missing_index_entry_is_not_found_even_with_ledger_record() {
        let h = Harness::connected().await;
        h.contract.seed(
            ShipmentId::new(30).unwrap(),
            "x",
            addr(SENDER),
            addr(RECEIVER),
            ContentId::new("bafk30").unwrap(),
        );
        let err = h.sync.fetch_shipment("30").await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn index_read_failure_is_transient() {
        let h = Harness::connected().await;
        h.index.set_fail_reads(true);
        let err = h.sync.fetch_shipment("4").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientIo);
    }

    #[tokio::test]
    async fn fetch_with_explicit_connection_flag() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("13")).await.unwrap();
        h.session.disconnect();
        let view = h.sync.fetch_shipment_with("13", true).await.unwrap();
        assert!(view.ledger_confirmed);
    }

    #[tokio::test]
    async fn claim_requires_sign_in_and_receiver_identity() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("21")).await.unwrap();

        let err = h.sync.claim_document("21", false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = h.sync.claim_document("21", true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        h.session.on_identity_changed(Some(addr(RECEIVER)));
        let claimed = h.sync.claim_document("21", true).await.unwrap();
        assert_eq!(claimed.receiver, addr(RECEIVER));
        assert!(claimed.document_url.ends_with(claimed.content_id.as_str()));

        h.session.disconnect();
        let err = h.sync.claim_document("21", true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
    }

    #[tokio::test]
    async fn claim_of_unknown_shipment_is_not_found() {
        let h = Harness::connected().await;
        let err = h.sync.claim_document("404", true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn replace_document_updates_ledger_and_index() {
        let h = Harness::connected().await;
        let created = h.sync.create_shipment(&request("40")).await.unwrap();

        let outcome = h
            .sync
            .replace_document("40", Bytes::from_static(b"amended invoice"))
            .await
            .unwrap();
        assert!(outcome.index_warning.is_none());
        assert_ne!(Some(&outcome.document.content_id), created.view.content_id.as_ref());

        let view = h.sync.fetch_shipment("40").await.unwrap();
        assert_eq!(view.content_id, Some(outcome.document.content_id.clone()));
        let stored = h.index.get(ShipmentId::new(40).unwrap()).unwrap();
        assert_eq!(stored.document_url, outcome.document.gateway_url);
    }

    #[tokio::test]
    async fn replace_document_by_non_sender_is_not_owner() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("41")).await.unwrap();
        h.session.on_identity_changed(Some(addr(RECEIVER)));
        let err = h
            .sync
            .replace_document("41", Bytes::from_static(b"forged"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
    }

    #[tokio::test]
    async fn replace_document_index_failure_is_a_warning() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("42")).await.unwrap();
        h.index.set_fail_writes(true);
        let outcome = h
            .sync
            .replace_document("42", Bytes::from_static(b"amended"))
            .await
            .unwrap();
        assert!(outcome.index_warning.is_some());
    }

    #[tokio::test]
    async fn update_status_overwrites_index_only() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("50")).await.unwrap();
        let sends = h.contract.send_calls();

        let record = h
            .sync
            .update_status("50", ShipmentStatus::InTransit)
            .await
            .unwrap();
        assert_eq!(record.status, ShipmentStatus::InTransit);
        assert_eq!(h.sync.fetch_shipment("50").await.unwrap().status, ShipmentStatus::InTransit);
        assert_eq!(h.contract.send_calls(), sends);

        let err = h
            .sync
            .update_status("51", ShipmentStatus::Delivered)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn concurrent_creates_with_different_ids_are_independent() {
        let h = Harness::connected().await;
        let (req_a, req_b) = (request("61"), request("62"));
        let (a, b) = tokio::join!(
            h.sync.create_shipment(&req_a),
            h.sync.create_shipment(&req_b)
        );
        assert!(a.unwrap().is_complete());
        assert!(b.unwrap().is_complete());
        assert_eq!(h.index.len(), 2);
        assert_eq!(h.contract.len(), 2);
    }

    #[tokio::test]
    async fn same_id_race_keeps_the_ledger_winner_in_the_index() {
        let h = Harness::connected().await;
        h.contract.set_deferred(true);
        let first = CreateShipmentRequest {
            contents: "Vaccines".into(),
            ..request("70")
        };
        let second = CreateShipmentRequest {
            contents: "Bandages".into(),
            payload: Bytes::from_static(b"second manifest"),
            ..request("70")
        };

        let (a, b) = tokio::join!(h.sync.create_shipment(&first), h.sync.create_shipment(&second));
        let (winner, loser) = match (a, b) {
            (Ok(outcome), Err(e)) | (Err(e), Ok(outcome)) => (outcome, e),
            (a, b) => panic!("expected exactly one success, got {:?} / {:?}", a.is_ok(), b.is_ok()),
        };
        assert!(winner.is_complete());
        assert_eq!(loser.kind(), ErrorKind::SubmissionRejected);

        // Both documents were uploaded and both transactions accepted, but
        // only the confirmed one reached the index.
        assert_eq!(h.documents.upload_calls(), 2);
        assert_eq!(h.contract.send_calls(), 2);
        assert_eq!(h.index.write_calls(), 1);

        let stored = h.index.get(ShipmentId::new(70).unwrap()).unwrap();
        assert_eq!(stored.description, winner.view.description);
        assert_eq!(Some(stored.transaction_ref), winner.view.transaction_ref);

        let view = h.sync.fetch_shipment("70").await.unwrap();
        assert_eq!(view.description, winner.view.description);
        assert_eq!(view.content_id, winner.view.content_id);
    }

    #[tokio::test]
    async fn entry_naming_another_shipment_is_malformed() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("9")).await.unwrap();
        let mut moved = h.index.get(ShipmentId::new(9).unwrap()).unwrap();
        moved.id = ShipmentId::new(10).unwrap();
        h.index.write(ShipmentId::new(8).unwrap(), &moved).await.unwrap();

        let err = h.sync.fetch_shipment("8").await.unwrap_err();
        assert!(matches!(err, SyncError::Index(IndexError::Malformed { .. })));
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = h.sync.update_status("8", ShipmentStatus::Delayed).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn entry_without_creation_time_still_fetches() {
        let h = Harness::connected().await;
        h.sync.create_shipment(&request("11")).await.unwrap();
        let id = ShipmentId::new(11).unwrap();
        let mut edited = h.index.get(id).unwrap();
        edited.created_at = None;
        h.index.insert(edited);

        let view = h.sync.fetch_shipment("11").await.unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.created_at, None);
        assert!(view.ledger_confirmed);
    }
}
