use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Index store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexStoreConfig {
    /// Root URL of the realtime database.
    pub database_url: String,
    /// Value for the `auth` query parameter, if the database requires one.
    pub auth_token: Option<String>,
    pub request_timeout_ms: u64,
}

impl IndexStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for IndexStoreConfig {
    fn default() -> Self {
        Self {
            database_url: "http://127.0.0.1:9000".into(),
            auth_token: None,
            request_timeout_ms: 10_000,
        }
    }
}
