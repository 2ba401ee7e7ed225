use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing or validating foundation types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid shipment identifier {input:?}: {reason}")]
    InvalidIdentifier { input: String, reason: &'static str },

    #[error("invalid account address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: &'static str },

    #[error("invalid content identifier {0:?}")]
    InvalidContentId(String),

    #[error("invalid transaction reference {0:?}")]
    InvalidTransactionRef(String),
}

impl TypeError {
    /// Type errors are always caller input problems.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

/// Stable classification carried by every error in the registry.
///
/// Callers match on the kind; the `Display` of the concrete error is the
/// human-readable cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before any I/O: bad identifier, bad address, bad payload.
    InvalidInput,
    /// The operation needs a signing identity and none is held.
    NotConnected,
    /// The identity provider could not be reached.
    ProviderUnavailable,
    /// Another connection attempt did not settle in time.
    ConnectionTimeout,
    /// The ledger refused the transaction.
    SubmissionRejected,
    /// The ledger refused the fee parameters.
    Underpriced,
    /// The ledger refused a write by someone other than the record's sender.
    NotOwner,
    /// No index entry for the identifier.
    NotFound,
    /// Ledger write confirmed, index write failed.
    PartialSuccess,
    /// Document or index store network failure; safe to retry.
    TransientIo,
    /// The caller is not allowed to perform the operation.
    Unauthorized,
    /// Broken internal invariant.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotConnected => "not_connected",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ConnectionTimeout => "connection_timeout",
            Self::SubmissionRejected => "submission_rejected",
            Self::Underpriced => "underpriced",
            Self::NotOwner => "not_owner",
            Self::NotFound => "not_found",
            Self::PartialSuccess => "partial_success",
            Self::TransientIo => "transient_io",
            Self::Unauthorized => "unauthorized",
            Self::Internal => "internal",
        }
    }

    /// Whether the caller can safely repeat the failed operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientIo | Self::ConnectionTimeout | Self::ProviderUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_match_serde() {
        for kind in [
            ErrorKind::InvalidInput,
            ErrorKind::NotConnected,
            ErrorKind::PartialSuccess,
            ErrorKind::TransientIo,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn only_io_like_kinds_are_retryable() {
        assert!(ErrorKind::TransientIo.is_retryable());
        assert!(!ErrorKind::SubmissionRejected.is_retryable());
        assert!(!ErrorKind::InvalidInput.is_retryable());
    }

    #[test]
    fn type_errors_are_invalid_input() {
        let err = TypeError::InvalidContentId(String::new());
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
