//! Service-to-service caller authenticated by a shared key.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

use rollcall_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::required_header;

pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// A trusted backend service (the recognition pipeline). Rejected for every
/// call when no key is configured.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCaller;

impl FromRequestParts<AppState> for ServiceCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state
            .config
            .attendance
            .service_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
        else {
            warn!("Service call rejected: no service key configured");
            return Err(AppError::authentication("Service access is disabled").into());
        };

        let presented = required_header(&parts.headers, SERVICE_KEY_HEADER, "Missing service key")?;
        if !keys_match(presented.as_bytes(), expected.as_bytes()) {
            warn!("Service call rejected: wrong service key");
            return Err(AppError::authentication("Invalid service key").into());
        }
        Ok(ServiceCaller)
    }
}

/// Comparison whose duration does not depend on where the inputs differ.
fn keys_match(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
