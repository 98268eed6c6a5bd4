//! `AuthUser` extractor: bearer access token plus `X-Device-Id`.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use rollcall_core::error::AppError;
use rollcall_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Value of a header that must be present and non-blank.
pub(crate) fn required_header<'a>(
    headers: &'a HeaderMap,
    name: &str,
    missing: &str,
) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::authentication(missing.to_string()))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = required_header(headers, "authorization", "Missing Authorization header")?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let device_id = required_header(&parts.headers, DEVICE_ID_HEADER, "Missing device id")?;

        let user = state.auth.authenticate(token, device_id).await?;
        Ok(AuthUser(RequestContext::new(&user, device_id)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_blank_device_id_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(DEVICE_ID_HEADER, HeaderValue::from_static("   "));
        assert!(required_header(&headers, DEVICE_ID_HEADER, "missing").is_err());
    }
}
