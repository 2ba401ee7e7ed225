use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection session settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON-RPC endpoint of the wallet / signing node.
    pub provider_url: String,
    /// How long a second caller waits for an in-flight connect to settle.
    pub connect_wait_ms: u64,
    /// Per-request timeout for JSON-RPC calls to the provider.
    pub request_timeout_ms: u64,
}

impl SessionConfig {
    pub fn connect_wait(&self) -> Duration {
        Duration::from_millis(self.connect_wait_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://127.0.0.1:8545".into(),
            // Ten waits of 500ms.
            connect_wait_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = SessionConfig::default();
        assert_eq!(c.connect_wait(), Duration::from_secs(5));
        assert_eq!(c.request_timeout(), Duration::from_secs(10));
        assert_eq!(c.provider_url, "http://127.0.0.1:8545");
    }
}
