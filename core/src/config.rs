//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the default HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Whole-call timeout in milliseconds. `None` keeps the transport default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Largest response body accepted.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_body_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_user_agent() -> String {
    concat!("pararest/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}
