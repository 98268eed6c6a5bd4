//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One login of one user on one device.
///
/// At most one row per user has `is_active = true`. Rows are deactivated,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque random identifier issued at login; the client replays it on
    /// every request next to its access token.
    pub device_id: String,
    /// SHA-256 hex digest of the current access token.
    #[serde(skip_serializing)]
    pub access_token_hash: String,
    /// SHA-256 hex digest of the current refresh token.
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether this row is the live session for `(user_id, device_id)`.
    pub fn matches(&self, user_id: Uuid, device_id: &str) -> bool {
        self.is_active && self.user_id == user_id && self.device_id == device_id
    }
}

/// Data required to open a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub device_id: String,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
}

impl NewSession {
    /// Materialize the row as it will be stored.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            device_id: self.device_id,
            access_token_hash: self.access_token_hash,
            refresh_token_hash: self.refresh_token_hash,
            is_active: true,
            last_activity: now,
            created_at: now,
        }
    }
}
