use serde::{Deserialize, Serialize};
use shipreg_store::UploadedDocument;
use shipreg_types::{
    AccountAddress, ContentId, ErrorKind, IndexRecord, ReconciledView, ShipmentId, TransactionRef,
};

use crate::state::CreationState;

/// How a creation ended, given that the ledger accepted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateStatus {
    Complete,
    /// The ledger record exists but the index write failed. Writing
    /// `pending` again is safe; see
    /// [`crate::RegistrySynchronizer::retry_index_write`].
    PartialSuccess { cause: String, pending: IndexRecord },
}

/// Result of `create_shipment`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateOutcome {
    pub view: ReconciledView,
    pub trace: Vec<CreationState>,
    pub status: CreateStatus,
}

impl CreateOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self.status, CreateStatus::Complete)
    }

    /// `Some(PartialSuccess)` when the caller should be warned.
    pub fn warning_kind(&self) -> Option<ErrorKind> {
        match self.status {
            CreateStatus::Complete => None,
            CreateStatus::PartialSuccess { .. } => Some(ErrorKind::PartialSuccess),
        }
    }
}

/// Result of `replace_document`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutcome {
    pub id: ShipmentId,
    pub transaction_ref: TransactionRef,
    pub document: UploadedDocument,
    /// Set when the index could not be refreshed. The ledger is updated
    /// regardless.
    pub index_warning: Option<String>,
}

/// A document released to its receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedDocument {
    pub id: ShipmentId,
    pub receiver: AccountAddress,
    pub content_id: ContentId,
    pub document_url: String,
}
