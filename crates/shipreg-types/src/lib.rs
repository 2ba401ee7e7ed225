//! Foundation types for the shipment registry.
//!
//! Every other `shipreg` crate depends on this one. It defines the values
//! that flow between the ledger, the descriptive index and the document
//! store, and the validation rules applied before any of them is touched.
//!
//! # Key Types
//!
//! - [`ShipmentId`]: Positive integer key shared by the ledger and the index
//! - [`AccountAddress`]: EVM account address, always displayed checksummed
//! - [`ContentId`]: Identifier of a document in the content-addressed store
//! - [`TransactionRef`]: Hash of a submitted ledger transaction
//! - [`LedgerRecord`]: Authoritative shipment fields owned by the ledger
//! - [`IndexRecord`]: Mutable descriptive record owned by the index
//! - [`ReconciledView`]: Read-time merge of the two
//! - [`ErrorKind`]: Stable error taxonomy shared by every crate

pub mod address;
pub mod content;
pub mod error;
pub mod id;
pub mod record;

pub use address::AccountAddress;
pub use content::{ContentId, TransactionRef};
pub use error::{ErrorKind, TypeError};
pub use id::ShipmentId;
pub use record::{IndexRecord, LedgerRecord, ReconciledView, ShipmentStatus};
