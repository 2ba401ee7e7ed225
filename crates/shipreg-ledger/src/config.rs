use std::time::Duration;

use serde::{Deserialize, Serialize};
use shipreg_types::AccountAddress;

/// Gas and fee parameters for ledger writes.
///
/// Fees are fixed rather than queried from the network: submissions are
/// deterministic and skip a round trip, at the price of overpaying when the
/// network is quiet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    /// Lowest gas limit ever submitted, whatever the estimate says.
    pub gas_floor: u64,
    /// EIP-1559 priority fee, in wei.
    pub max_priority_fee_per_gas: u64,
    /// EIP-1559 fee cap, in wei.
    pub max_fee_per_gas: u64,
}

impl FeePolicy {
    /// Gas limit for a call with the given estimate.
    pub fn gas_limit(&self, estimate: u64) -> u64 {
        estimate.max(self.gas_floor)
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            gas_floor: 250_000,
            max_priority_fee_per_gas: 2_500_000_000,
            max_fee_per_gas: 30_000_000_000,
        }
    }
}

/// Ledger connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deployed shipment contract. Required for the JSON-RPC backend.
    pub contract_address: Option<AccountAddress>,
    pub fees: FeePolicy,
    /// Delay between `eth_getTransactionReceipt` polls.
    pub receipt_poll_interval_ms: u64,
    /// Give up waiting for a receipt after this long.
    pub receipt_timeout_ms: u64,
}

impl LedgerConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            contract_address: None,
            fees: FeePolicy::default(),
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_ms: 120_000,
        }
    }
}
