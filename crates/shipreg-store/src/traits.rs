use async_trait::async_trait;
use bytes::Bytes;
use shipreg_types::ContentId;

use crate::error::StoreResult;

/// Content-addressed document store.
///
/// The same bytes always yield the same content id. Implementations do not
/// enforce size limits; that is [`crate::DocumentStoreAdapter`]'s job, so
/// that oversized payloads never reach the network.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `payload` and return its content id.
    async fn upload(&self, payload: Bytes) -> StoreResult<ContentId>;
}
