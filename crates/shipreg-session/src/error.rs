use std::time::Duration;

use shipreg_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("identity provider returned no accounts; unlock the wallet and retry")]
    NoIdentity,

    #[error("wallet connection is taking too long (waited {waited:?} for the attempt in flight)")]
    ConnectionTimeout { waited: Duration },

    #[error("no wallet connected")]
    NotConnected,

    #[error("account authorization rejected: {0}")]
    AuthorizationRejected(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::NoIdentity | Self::NotConnected => ErrorKind::NotConnected,
            Self::ConnectionTimeout { .. } => ErrorKind::ConnectionTimeout,
            Self::AuthorizationRejected(_) => ErrorKind::Unauthorized,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
