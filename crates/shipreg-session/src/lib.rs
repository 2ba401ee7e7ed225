//! Wallet connection session for the shipment registry.
//!
//! The session is the only shared mutable state in the registry client. It
//! holds the signer identity obtained from an external identity provider and
//! guarantees that at most one authorization request is in flight at a time.
//!
//! # Key Types
//!
//! - [`ConnectionSession`] -- identity holder with the connect guard
//! - [`IdentityProvider`] -- boundary to the wallet (`eth_accounts`, `eth_requestAccounts`)
//! - [`JsonRpcIdentityProvider`] -- provider reached over HTTP JSON-RPC
//! - [`StaticIdentityProvider`] -- fixed account list for embedding and tests
//! - [`JsonRpcClient`] -- JSON-RPC 2.0 transport shared with the ledger client

pub mod config;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use provider::{IdentityProvider, JsonRpcIdentityProvider, StaticIdentityProvider};
pub use rpc::{JsonRpcClient, RpcError};
pub use session::ConnectionSession;
