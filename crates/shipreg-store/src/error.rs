use shipreg_types::ErrorKind;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing to upload.
    #[error("document payload is empty")]
    EmptyPayload,

    /// Rejected locally; no upload was attempted.
    #[error("document is {size} bytes, limit is {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// The store could not be reached or failed the request.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the content identifier could not be read.
    #[error("unexpected document store response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPayload | Self::PayloadTooLarge { .. } => ErrorKind::InvalidInput,
            Self::Unavailable(_) | Self::InvalidResponse(_) => ErrorKind::TransientIo,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Result alias for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;
