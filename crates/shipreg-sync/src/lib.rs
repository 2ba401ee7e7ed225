//! Registry synchronizer for the shipment registry.
//!
//! Coordinates three independently failing stores into two public flows:
//!
//! - **create**: validate, upload the document, create the ledger record,
//!   then write the index entry. The ledger write is the commit point.
//! - **fetch**: read the index and (with an identity) the ledger
//!   concurrently, then merge with ledger fields winning.
//!
//! Also provides document replacement, status updates, receiver claims and
//! the aggregate [`RegistryConfig`]. [`safety`] judges whether a medicine
//! shipment can travel before it is registered.

pub mod config;
pub mod error;
pub mod reconcile;
pub mod request;
pub mod safety;
pub mod state;
pub mod synchronizer;
pub mod types;

pub use config::{RegistryConfig, SynchronizerConfig};
pub use error::{SyncError, SyncResult};
pub use reconcile::{reconcile, LedgerRead};
pub use request::{sanitize, CreateShipmentRequest, ValidatedCreate};
pub use safety::{MedicineCatalog, MedicineProfile, SafetyProblem, SafetyVerdict, ShippingCheck};
pub use state::{CreationMachine, CreationState};
pub use synchronizer::RegistrySynchronizer;
pub use types::{ClaimedDocument, CreateOutcome, CreateStatus, ReplaceOutcome};
