use shipreg_session::SessionError;
use shipreg_types::{ErrorKind, ShipmentId, TypeError};

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    InvalidInput(#[from] TypeError),

    #[error("ledger rejected the submission: {0}")]
    SubmissionRejected(String),

    #[error("ledger rejected the fee parameters: {0}")]
    Underpriced(String),

    #[error("caller does not own the shipment record: {0}")]
    NotOwner(String),

    #[error("no ledger record for shipment {0}")]
    RecordNotFound(ShipmentId),

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("malformed ledger output: {0}")]
    Decode(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::SubmissionRejected(_) => ErrorKind::SubmissionRejected,
            Self::Underpriced(_) => ErrorKind::Underpriced,
            Self::NotOwner(_) => ErrorKind::NotOwner,
            Self::RecordNotFound(_) => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::TransientIo,
            Self::Decode(_) => ErrorKind::Internal,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
