//! Auth handlers: login, refresh, sign-out.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::dto::request::LoginRequest;
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, RefreshResponse, SignoutAllResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::auth::{DEVICE_ID_HEADER, required_header};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let outcome = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        user: UserResponse::from(&outcome.user),
        access_token: outcome.access_token.token,
        access_expires_at: outcome.access_token.expires_at,
        refresh_token: outcome.refresh_token.token,
        refresh_expires_at: outcome.refresh_token.expires_at,
        device_id: outcome.device_id,
    })))
}

/// GET /api/v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let token = required_header(&headers, REFRESH_TOKEN_HEADER, "Missing refresh token")?;
    let device_id = required_header(&headers, DEVICE_ID_HEADER, "Missing device id")?;

    let outcome = state.auth.refresh(token, device_id).await?;
    let (refresh_token, refresh_expires_at) = match outcome.refresh_token {
        Some(rotated) => (Some(rotated.token), Some(rotated.expires_at)),
        None => (None, None),
    };

    Ok(Json(ApiResponse::ok(RefreshResponse {
        access_token: outcome.access_token.token,
        access_expires_at: outcome.access_token.expires_at,
        refresh_token,
        refresh_expires_at,
    })))
}

/// POST /api/v1/auth/signout
pub async fn signout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth.logout(auth.user_id, &auth.device_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Signed out successfully",
    ))))
}

/// POST /api/v1/auth/signout-all
pub async fn signout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<SignoutAllResponse>>, ApiError> {
    let sessions_closed = state.auth.logout_all(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(SignoutAllResponse { sessions_closed })))
}
