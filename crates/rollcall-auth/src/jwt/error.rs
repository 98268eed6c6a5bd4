//! Token failure kinds.

use rollcall_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Why a token could not be issued or verified.
///
/// `Expired` and `Invalid` stay distinct all the way to the client: the
/// first starts a refresh, the second is a hard reject.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::token_expired("Token has expired"),
            TokenError::Invalid(_) => {
                AppError::with_source(ErrorKind::Authentication, "Invalid token", err)
            }
            TokenError::Signing(_) => {
                AppError::with_source(ErrorKind::Internal, "Failed to sign token", err)
            }
        }
    }
}
