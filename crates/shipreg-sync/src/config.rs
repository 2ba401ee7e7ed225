use std::path::Path;

use serde::{Deserialize, Serialize};
use shipreg_index::IndexStoreConfig;
use shipreg_ledger::LedgerConfig;
use shipreg_session::SessionConfig;
use shipreg_store::DocumentStoreConfig;
use shipreg_types::AccountAddress;

use crate::error::{SyncError, SyncResult};

/// Synchronizer settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynchronizerConfig {
    /// Longest source location kept in the on-ledger description, in chars.
    pub max_source_chars: usize,
    pub max_destination_chars: usize,
    pub max_contents_chars: usize,
    /// Block explorer link for a shipment. `{contract}` and `{id}` are
    /// substituted.
    pub explorer_url_template: String,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            max_source_chars: 64,
            max_destination_chars: 64,
            max_contents_chars: 256,
            explorer_url_template: "https://sepolia.etherscan.io/token/{contract}/token/{id}"
                .into(),
        }
    }
}

/// Everything needed to assemble a registry client.
///
/// Loaded from TOML; every section and field is optional. `SHIPREG_*`
/// environment variables override file values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub session: SessionConfig,
    pub ledger: LedgerConfig,
    pub documents: DocumentStoreConfig,
    pub index: IndexStoreConfig,
    pub sync: SynchronizerConfig,
}

impl RegistryConfig {
    pub fn from_toml_str(input: &str) -> SyncResult<Self> {
        toml::from_str(input).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_toml_string(&self) -> SyncResult<String> {
        toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Apply `SHIPREG_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> SyncResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> SyncResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn number<T: std::str::FromStr>(key: &str, raw: String) -> SyncResult<T> {
            raw.trim()
                .parse()
                .map_err(|_| SyncError::Config(format!("{key}: not a number: {raw:?}")))
        }

        if let Some(v) = lookup("SHIPREG_PROVIDER_URL") {
            self.session.provider_url = v;
        }
        if let Some(v) = lookup("SHIPREG_CONNECT_WAIT_MS") {
            self.session.connect_wait_ms = number("SHIPREG_CONNECT_WAIT_MS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_RPC_TIMEOUT_MS") {
            self.session.request_timeout_ms = number("SHIPREG_RPC_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_CONTRACT_ADDRESS") {
            let address = AccountAddress::parse(&v)
                .map_err(|e| SyncError::Config(format!("SHIPREG_CONTRACT_ADDRESS: {e}")))?;
            self.ledger.contract_address = Some(address);
        }
        if let Some(v) = lookup("SHIPREG_GAS_FLOOR") {
            self.ledger.fees.gas_floor = number("SHIPREG_GAS_FLOOR", v)?;
        }
        if let Some(v) = lookup("SHIPREG_MAX_PRIORITY_FEE_PER_GAS") {
            self.ledger.fees.max_priority_fee_per_gas =
                number("SHIPREG_MAX_PRIORITY_FEE_PER_GAS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_MAX_FEE_PER_GAS") {
            self.ledger.fees.max_fee_per_gas = number("SHIPREG_MAX_FEE_PER_GAS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_RECEIPT_TIMEOUT_MS") {
            self.ledger.receipt_timeout_ms = number("SHIPREG_RECEIPT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_GATEWAY_URL_TEMPLATE") {
            self.documents.gateway_url_template = v;
        }
        if let Some(v) = lookup("SHIPREG_MAX_UPLOAD_BYTES") {
            self.documents.max_upload_bytes = number("SHIPREG_MAX_UPLOAD_BYTES", v)?;
        }
        if let Some(v) = lookup("SHIPREG_IPFS_API_URL") {
            self.documents.api_url = v;
        }
        if let Some(v) = lookup("SHIPREG_IPFS_API_TOKEN") {
            self.documents.api_token = Some(v);
        }
        if let Some(v) = lookup("SHIPREG_IPFS_TIMEOUT_MS") {
            self.documents.request_timeout_ms = number("SHIPREG_IPFS_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("SHIPREG_INDEX_URL") {
            self.index.database_url = v;
        }
        if let Some(v) = lookup("SHIPREG_INDEX_AUTH") {
            self.index.auth_token = Some(v);
        }
        if let Some(v) = lookup("SHIPREG_EXPLORER_URL_TEMPLATE") {
            self.sync.explorer_url_template = v;
        }
        Ok(())
    }
}
