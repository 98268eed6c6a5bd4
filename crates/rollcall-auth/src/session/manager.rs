//! Login, request authentication, refresh, and sign-out flows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use rollcall_core::config::AuthConfig;
use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_database::store::UserDirectory;
use rollcall_entity::user::User;

use crate::jwt::{IssuedToken, TokenAuthority, TokenKind};
use crate::password::CredentialHasher;

use super::registry::SessionRegistry;

/// Credentials a client receives at login and replays afterwards.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
    pub device_id: String,
}

/// Result of exchanging a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: IssuedToken,
    /// Present when the refresh token was old enough to be rotated.
    pub refresh_token: Option<IssuedToken>,
}

/// Ties the credential hasher, token authority, and session registry together.
#[derive(Clone)]
pub struct AuthManager {
    authority: Arc<TokenAuthority>,
    registry: Arc<SessionRegistry>,
    hasher: Arc<CredentialHasher>,
    users: Arc<dyn UserDirectory>,
    rotation_after: Duration,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("authority", &self.authority)
            .field("rotation_after", &self.rotation_after)
            .finish()
    }
}

impl AuthManager {
    pub fn new(
        authority: Arc<TokenAuthority>,
        registry: Arc<SessionRegistry>,
        hasher: Arc<CredentialHasher>,
        users: Arc<dyn UserDirectory>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            authority,
            registry,
            hasher,
            users,
            rotation_after: Duration::days(config.refresh_rotation_days as i64),
        }
    }

    /// Verify credentials, mint both tokens, and bind them to a new device id.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid email or password"))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::authentication("Invalid email or password"));
        }

        let access_token = self.authority.issue(user.id, TokenKind::Access)?;
        let refresh_token = self.authority.issue(user.id, TokenKind::Refresh)?;
        let device_id = self
            .registry
            .create_session(user.id, &access_token.token, &refresh_token.token)
            .await?;

        info!(user_id = %user.id, role = %user.role, "Login successful");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
            device_id,
        })
    }

    /// Authenticate a protected request. The token is verified first; a valid
    /// token whose session has been revoked is still rejected.
    pub async fn authenticate(&self, access_token: &str, device_id: &str) -> AppResult<User> {
        let payload = self.authority.verify(access_token, TokenKind::Access)?;

        if device_id.trim().is_empty() {
            return Err(AppError::authentication("Missing device id"));
        }
        if !self
            .registry
            .validate_session(payload.user_id, device_id)
            .await?
        {
            warn!(user_id = %payload.user_id, "Rejected token for inactive session");
            return Err(AppError::authentication("Session is no longer valid"));
        }

        self.users
            .find_by_id(payload.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))
    }

    /// Exchange the session's refresh token for a new access token, rotating
    /// the refresh token once it is older than the configured window.
    pub async fn refresh(&self, refresh_token: &str, device_id: &str) -> AppResult<RefreshOutcome> {
        let payload = self.authority.verify(refresh_token, TokenKind::Refresh)?;

        if device_id.trim().is_empty() {
            return Err(AppError::authentication("Missing device id"));
        }
        let session = self
            .registry
            .find_active(payload.user_id, device_id)
            .await?
            .ok_or_else(|| AppError::authentication("Session is no longer valid"))?;
        if !self.registry.refresh_token_matches(&session, refresh_token) {
            warn!(user_id = %payload.user_id, "Refresh token does not match session");
            return Err(AppError::authentication("Invalid refresh token"));
        }

        let access_token = self.authority.issue(payload.user_id, TokenKind::Access)?;
        let rotated = if Utc::now() - payload.issued_at >= self.rotation_after {
            Some(self.authority.issue(payload.user_id, TokenKind::Refresh)?)
        } else {
            None
        };

        self.registry
            .replace_tokens(
                session.id,
                &access_token.token,
                rotated.as_ref().map(|t| t.token.as_str()),
            )
            .await?;

        info!(
            user_id = %payload.user_id,
            rotated = rotated.is_some(),
            "Access token refreshed"
        );
        Ok(RefreshOutcome {
            access_token,
            refresh_token: rotated,
        })
    }

    /// Sign out the current device.
    pub async fn logout(&self, user_id: Uuid, device_id: &str) -> AppResult<()> {
        self.registry.invalidate_session(user_id, device_id).await
    }

    /// Sign out every device of the user.
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.registry.invalidate_all(user_id).await
    }
}
