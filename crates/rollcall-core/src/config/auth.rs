//! Token and session configuration.

use serde::{Deserialize, Serialize};

/// Access/refresh token settings.
///
/// The two secrets must be different; [`super::AppConfig::validate`]
/// rejects a configuration that reuses one for both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_token_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    pub refresh_token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// A refresh token older than this is replaced on the next refresh.
    #[serde(default = "default_rotation_days")]
    pub refresh_rotation_days: u64,
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_rotation_days() -> u64 {
    3
}
