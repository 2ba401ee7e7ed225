use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use shipreg_types::AccountAddress;

use crate::error::{SessionError, SessionResult};
use crate::rpc::{JsonRpcClient, RpcError};

/// Boundary to the external signing provider (wallet).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Accounts already authorized for this client. Never prompts.
    async fn get_accounts(&self) -> SessionResult<Vec<AccountAddress>>;

    /// Ask the wallet to authorize an account. May prompt the user.
    async fn request_accounts(&self) -> SessionResult<Vec<AccountAddress>>;
}

/// EIP-1193 code for "user rejected the request".
const USER_REJECTED: i64 = 4001;

/// Identity provider reached over HTTP JSON-RPC.
pub struct JsonRpcIdentityProvider {
    rpc: JsonRpcClient,
}

impl JsonRpcIdentityProvider {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }

    async fn accounts(&self, method: &str) -> SessionResult<Vec<AccountAddress>> {
        let raw: Vec<String> = self
            .rpc
            .call(method, json!([]))
            .await
            .map_err(|e| self.map_rpc_error(e))?;
        raw.iter()
            .map(|a| {
                AccountAddress::parse(a)
                    .map_err(|e| SessionError::ProviderUnavailable(format!("{method}: {e}")))
            })
            .collect()
    }

    fn map_rpc_error(&self, err: RpcError) -> SessionError {
        match err {
            RpcError::Server { code: USER_REJECTED, message, .. } => {
                SessionError::AuthorizationRejected(message)
            }
            other => SessionError::ProviderUnavailable(format!("{}: {other}", self.rpc.url())),
        }
    }
}

#[async_trait]
impl IdentityProvider for JsonRpcIdentityProvider {
    async fn get_accounts(&self) -> SessionResult<Vec<AccountAddress>> {
        self.accounts("eth_accounts").await
    }

    async fn request_accounts(&self) -> SessionResult<Vec<AccountAddress>> {
        self.accounts("eth_requestAccounts").await
    }
}

/// Provider with a fixed account list.
///
/// Used for embedding with a locally managed signer and as the test double
/// for the session: it counts calls and can be made slow or unreachable.
pub struct StaticIdentityProvider {
    accounts: Vec<AccountAddress>,
    authorized: AtomicBool,
    available: bool,
    request_delay: Duration,
    get_calls: AtomicUsize,
    request_calls: AtomicUsize,
}

impl StaticIdentityProvider {
    /// Accounts are already authorized; `get_accounts` returns them.
    pub fn authorized(accounts: Vec<AccountAddress>) -> Self {
        Self::build(accounts, true, true)
    }

    /// Accounts only appear after `request_accounts`.
    pub fn requiring_approval(accounts: Vec<AccountAddress>) -> Self {
        Self::build(accounts, false, true)
    }

    /// Every call fails with `ProviderUnavailable`.
    pub fn unavailable() -> Self {
        Self::build(Vec::new(), false, false)
    }

    fn build(accounts: Vec<AccountAddress>, authorized: bool, available: bool) -> Self {
        Self {
            accounts,
            authorized: AtomicBool::new(authorized),
            available,
            request_delay: Duration::ZERO,
            get_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
        }
    }

    /// Delay `request_accounts`, simulating a user reading the prompt.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> SessionResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(SessionError::ProviderUnavailable("no provider detected".into()))
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_accounts(&self) -> SessionResult<Vec<AccountAddress>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> SessionResult<Vec<AccountAddress>> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.accounts.clone())
    }
}
