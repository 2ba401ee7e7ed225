//! Document storage for the shipment registry.
//!
//! Shipment documents live in a content-addressed store (IPFS). The
//! registry only needs two things from it: upload bytes and get back a
//! content identifier, and turn that identifier into a display URL without
//! touching the network.
//!
//! # Key Types
//!
//! - [`DocumentStore`] -- upload boundary implemented by each backend
//! - [`DocumentStoreAdapter`] -- size policy and gateway URL derivation
//! - [`InMemoryDocumentStore`] -- hash-addressed store for tests and embedding
//! - [`IpfsHttpDocumentStore`] -- IPFS HTTP API (`/api/v0/add`) backend

pub mod adapter;
pub mod config;
pub mod error;
pub mod ipfs;
pub mod memory;
pub mod traits;

pub use adapter::{check_payload, DocumentStoreAdapter, UploadedDocument};
pub use config::DocumentStoreConfig;
pub use error::{StoreError, StoreResult};
pub use ipfs::IpfsHttpDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
