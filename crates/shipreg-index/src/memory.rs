use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use shipreg_types::{IndexRecord, ShipmentId};

use crate::error::{IndexError, IndexResult};
use crate::traits::IndexStore;

/// In-memory index.
///
/// Intended for tests and embedding. Reads and writes are counted, and each
/// direction can be made to fail deterministically.
pub struct InMemoryIndexStore {
    records: RwLock<BTreeMap<ShipmentId, IndexRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            read_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Direct lookup, bypassing counters and failure injection.
    pub fn get(&self, id: ShipmentId) -> Option<IndexRecord> {
        self.records.read().expect("lock poisoned").get(&id).cloned()
    }

    /// Direct insert, bypassing counters and failure injection.
    pub fn insert(&self, record: IndexRecord) {
        self.records
            .write()
            .expect("lock poisoned")
            .insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIndexStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn read(&self, id: ShipmentId) -> IndexResult<Option<IndexRecord>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("injected read failure".into()));
        }
        Ok(self.get(id))
    }

    async fn write(&self, id: ShipmentId, record: &IndexRecord) -> IndexResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("injected write failure".into()));
        }
        self.records
            .write()
            .expect("lock poisoned")
            .insert(id, record.clone());
        Ok(())
    }
}
