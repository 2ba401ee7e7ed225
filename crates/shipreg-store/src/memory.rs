use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use shipreg_types::ContentId;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// In-memory document store addressed by BLAKE3 hash.
///
/// Intended for tests and embedding. Content ids look like
/// `b3-<64 hex digits>`.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<ContentId, Bytes>>,
    fail_uploads: AtomicBool,
    upload_calls: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            upload_calls: AtomicUsize::new(0),
        }
    }

    /// Make every upload fail as if the store were unreachable.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of upload calls that reached the store, failed or not.
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, content_id: &ContentId) -> Option<Bytes> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(content_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upload(&self, payload: Bytes) -> StoreResult<ContentId> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected upload failure".into()));
        }
        let hash = blake3::hash(&payload);
        let content_id = ContentId::new(format!("b3-{}", hash.to_hex()))
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(content_id.clone(), payload);
        Ok(content_id)
    }
}
