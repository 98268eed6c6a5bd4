//! Session registry: one active `(device, tokens)` binding per user.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_database::store::SessionStore;
use rollcall_entity::session::{NewSession, Session};

/// Number of random bytes behind a device id (hex-encoded on the wire).
const DEVICE_ID_BYTES: usize = 32;

/// Issues device ids and tracks which one is live for each user.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry").finish_non_exhaustive()
    }
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Open a session for `user_id`, superseding any previous one, and return
    /// the newly issued device id.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> AppResult<String> {
        check_user(user_id)?;

        let device_id = generate_device_id();
        let session = self
            .store
            .activate(NewSession {
                user_id,
                device_id: device_id.clone(),
                access_token_hash: hash_token(access_token),
                refresh_token_hash: hash_token(refresh_token),
            })
            .await?;

        info!(user_id = %user_id, session_id = %session.id, "Session created");
        Ok(device_id)
    }

    /// True iff `(user_id, device_id)` is the user's active session. Refreshes
    /// `last_activity` on success.
    pub async fn validate_session(&self, user_id: Uuid, device_id: &str) -> AppResult<bool> {
        check_args(user_id, device_id)?;
        self.store.touch(user_id, device_id, Utc::now()).await
    }

    /// Mark the session inactive. A session that is already inactive is left alone.
    pub async fn invalidate_session(&self, user_id: Uuid, device_id: &str) -> AppResult<()> {
        check_args(user_id, device_id)?;
        if self.store.deactivate(user_id, device_id).await? {
            info!(user_id = %user_id, "Session invalidated");
        } else {
            debug!(user_id = %user_id, "Session already inactive");
        }
        Ok(())
    }

    /// Deactivate every session of the user.
    pub async fn invalidate_all(&self, user_id: Uuid) -> AppResult<u64> {
        check_user(user_id)?;
        let count = self.store.deactivate_all(user_id).await?;
        info!(user_id = %user_id, count, "All sessions invalidated");
        Ok(count)
    }

    pub async fn find_active(&self, user_id: Uuid, device_id: &str) -> AppResult<Option<Session>> {
        check_args(user_id, device_id)?;
        self.store.find_active(user_id, device_id).await
    }

    /// Store new token digests on an active session. `refresh_token` of `None`
    /// keeps the current refresh token valid.
    pub async fn replace_tokens(
        &self,
        session_id: Uuid,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> AppResult<()> {
        let refresh_hash = refresh_token.map(hash_token);
        let updated = self
            .store
            .update_tokens(session_id, &hash_token(access_token), refresh_hash.as_deref())
            .await?;
        if !updated {
            return Err(AppError::authentication("Session is no longer active"));
        }
        Ok(())
    }

    /// Whether `refresh_token` is the one currently bound to `session`.
    pub fn refresh_token_matches(&self, session: &Session, refresh_token: &str) -> bool {
        session.refresh_token_hash == hash_token(refresh_token)
    }
}

fn check_user(user_id: Uuid) -> AppResult<()> {
    if user_id.is_nil() {
        return Err(AppError::validation("User id is required"));
    }
    Ok(())
}

fn check_args(user_id: Uuid, device_id: &str) -> AppResult<()> {
    check_user(user_id)?;
    if device_id.trim().is_empty() {
        return Err(AppError::validation("Device id is required"));
    }
    Ok(())
}

/// SHA-256 hex digest; tokens are never stored verbatim.
pub(crate) fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn generate_device_id() -> String {
    let mut bytes = [0u8; DEVICE_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
