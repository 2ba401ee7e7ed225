//! Error types for the index crate.

use shipreg_types::{ErrorKind, ShipmentId};

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index could not be reached or refused the request.
    #[error("index store unavailable: {0}")]
    Unavailable(String),

    /// A stored entry could not be decoded.
    #[error("malformed index entry for shipment {id}: {reason}")]
    Malformed { id: ShipmentId, reason: String },

    /// Serialization of an outgoing record failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::TransientIo,
            Self::Malformed { .. } | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
