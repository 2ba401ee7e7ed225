use std::sync::Arc;
use std::time::Duration;

use shipreg_types::AccountAddress;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::provider::IdentityProvider;

/// Signer identity held by the running client.
///
/// One instance per client, shared by handle with the ledger client and the
/// synchronizer. The identity lives in a `watch` channel so reads never block
/// and observers see every account change. Connection attempts are
/// serialized by `gate`: a caller that finds it held waits for the attempt in
/// flight instead of issuing a second authorization request.
pub struct ConnectionSession {
    provider: Arc<dyn IdentityProvider>,
    identity: watch::Sender<Option<AccountAddress>>,
    gate: Mutex<()>,
    connect_wait: Duration,
}

impl ConnectionSession {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: &SessionConfig) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            provider,
            identity,
            gate: Mutex::new(()),
            connect_wait: config.connect_wait(),
        }
    }

    /// Obtain a signer identity, prompting the provider only if needed.
    ///
    /// Idempotent once connected. If another attempt is in flight this waits
    /// for it (bounded by `connect_wait_ms`) and reuses its result; if that
    /// attempt failed, this caller makes its own.
    pub async fn connect(&self) -> SessionResult<AccountAddress> {
        if let Some(address) = self.current_identity() {
            return Ok(address);
        }

        // Held for the whole attempt; dropping it on any exit path is what
        // clears the "connecting" state.
        let _attempt = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("connection attempt in flight, waiting for it to settle");
                tokio::time::timeout(self.connect_wait, self.gate.lock())
                    .await
                    .map_err(|_| SessionError::ConnectionTimeout {
                        waited: self.connect_wait,
                    })?
            }
        };

        if let Some(address) = self.current_identity() {
            return Ok(address);
        }

        let mut accounts = self.provider.get_accounts().await?;
        if accounts.is_empty() {
            info!("no authorized account, requesting authorization");
            accounts = self.provider.request_accounts().await?;
        }
        let address = accounts.into_iter().next().ok_or(SessionError::NoIdentity)?;

        self.identity.send_replace(Some(address));
        info!(address = %address, "wallet connected");
        Ok(address)
    }

    /// Non-blocking read of the held identity.
    pub fn current_identity(&self) -> Option<AccountAddress> {
        *self.identity.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.current_identity().is_some()
    }

    /// Whether a connection attempt currently holds the guard.
    pub fn is_connecting(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Identity for an operation that must sign.
    pub fn require_identity(&self) -> SessionResult<AccountAddress> {
        self.current_identity().ok_or(SessionError::NotConnected)
    }

    /// Account-change notification from the provider. `None` is a disconnect.
    pub fn on_identity_changed(&self, identity: Option<AccountAddress>) {
        let previous = self.identity.send_replace(identity);
        match (previous, identity) {
            (_, None) => warn!("wallet disconnected"),
            (Some(old), Some(new)) if old != new => info!(from = %old, to = %new, "wallet account changed"),
            (None, Some(new)) => info!(address = %new, "wallet account announced"),
            _ => {}
        }
    }

    pub fn disconnect(&self) {
        self.on_identity_changed(None);
    }

    /// Observe identity changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AccountAddress>> {
        self.identity.subscribe()
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("identity", &self.current_identity())
            .field("connecting", &self.is_connecting())
            .finish()
    }
}
