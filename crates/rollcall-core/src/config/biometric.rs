//! Face verification service configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the external face verification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiometricConfig {
    /// Base URL, e.g. `http://ml-service:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every verification call.
    #[serde(default)]
    pub api_token: String,
    /// Upper bound on a single verification call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}
