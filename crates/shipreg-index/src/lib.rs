//! Descriptive index for the shipment registry.
//!
//! The index holds the human-facing fields of a shipment (origin,
//! destination, expiry, status, document URL) under `shipments/<id>`. It is
//! a cache: writes overwrite the whole record, reads treat absence as "no
//! cached metadata", and nothing here is trusted for ownership.
//!
//! # Key Types
//!
//! - [`IndexStore`] -- keyed read/write boundary
//! - [`InMemoryIndexStore`] -- BTreeMap-backed store with failure injection
//! - [`RealtimeDbIndexStore`] -- realtime-database REST backend
//! - [`IndexStoreConfig`] -- backend settings

pub mod config;
pub mod error;
pub mod memory;
pub mod realtime;
pub mod traits;

pub use config::IndexStoreConfig;
pub use error::{IndexError, IndexResult};
pub use memory::InMemoryIndexStore;
pub use realtime::RealtimeDbIndexStore;
pub use traits::IndexStore;
