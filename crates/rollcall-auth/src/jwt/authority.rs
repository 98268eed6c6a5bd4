//! Token issuing and verification with per-kind secrets and lifetimes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use rollcall_core::config::AuthConfig;
use rollcall_core::error::AppError;

use super::claims::{Claims, TokenKind, TokenPayload};
use super::error::TokenError;

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
struct KeySet {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

/// Signs and verifies access and refresh tokens.
///
/// Holds no mutable state; the keys are fixed at construction.
#[derive(Clone)]
pub struct TokenAuthority {
    access: KeySet,
    refresh: KeySet,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}

impl TokenAuthority {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        if config.access_token_secret.is_empty() || config.refresh_token_secret.is_empty() {
            return Err(AppError::configuration("Token secrets must not be empty"));
        }
        if config.access_token_secret == config.refresh_token_secret {
            return Err(AppError::configuration(
                "Access and refresh tokens must use different secrets",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Ok(Self {
            access: KeySet {
                encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
                ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
            },
            refresh: KeySet {
                encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
                ttl: Duration::days(config.refresh_token_ttl_days as i64),
            },
            validation,
        })
    }

    fn keys(&self, kind: TokenKind) -> &KeySet {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign a token of `kind` for `user_id`, issued now.
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, kind, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let keys = self.keys(kind);
        let expires_at = issued_at + keys.ttl;
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type: kind,
        };

        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(TokenError::Signing)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, expiry, and kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            },
        )?;

        if data.claims.token_type != kind {
            return Err(TokenError::Invalid(format!(
                "expected {} token",
                kind.as_str()
            )));
        }

        Ok(data.claims.into())
    }
}
