//! Ledger client for the shipment registry.
//!
//! The ledger is an EVM contract reached over JSON-RPC with three methods:
//! `createShipment`, `uploadDocument` and `getShipmentDetails`. This crate
//! provides:
//! - the [`ShipmentContract`] boundary and its call/parameter types
//! - [`LedgerClient`], which adds identity checks, the gas floor, fixed
//!   EIP-1559 fees and rejection classification
//! - [`decode_shipment_details`], the one place that knows the read output
//!   may be keyed by name, by position, or both
//! - [`InMemoryShipmentContract`] for tests and embedding
//! - [`JsonRpcShipmentContract`] for a deployed contract

pub mod client;
pub mod config;
pub mod contract;
pub mod decode;
pub mod error;
pub mod memory;
pub mod rpc;

pub use client::LedgerClient;
pub use config::{FeePolicy, LedgerConfig};
pub use contract::{ContractCall, ContractError, ShipmentContract, TxParams};
pub use decode::decode_shipment_details;
pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryShipmentContract;
pub use rpc::JsonRpcShipmentContract;
