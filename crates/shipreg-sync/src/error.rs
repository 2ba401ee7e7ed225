use shipreg_index::IndexError;
use shipreg_ledger::LedgerError;
use shipreg_session::SessionError;
use shipreg_store::StoreError;
use shipreg_types::{ErrorKind, ShipmentId, TypeError};
use thiserror::Error;

use crate::state::CreationState;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Every problem found by the validation pass. Nothing was sent anywhere.
    #[error("invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("no shipment {0} in the index")]
    NotFound(ShipmentId),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("invalid creation transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: CreationState,
        to: CreationState,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Config(_) => ErrorKind::InvalidInput,
            Self::Session(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Index(e) => e.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidTransition { .. } => ErrorKind::Internal,
        }
    }
}

impl From<TypeError> for SyncError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(vec![e.to_string()])
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
