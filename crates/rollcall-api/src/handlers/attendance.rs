//! Attendance handlers: session lifecycle and check-ins.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use tracing::info;

use rollcall_core::error::AppError;
use rollcall_service::{AutoCheckInRequest, CheckInRequest};

use crate::dto::request::{AutoCheckInBody, CheckInBody, StartSessionRequest};
use crate::dto::response::{
    ApiResponse, AttendanceLogResponse, AttendanceSessionResponse, SessionAttendanceResponse,
};
use crate::error::ApiError;
use crate::extractors::path::parse_uuid;
use crate::extractors::{AuthUser, ServiceCaller, ValidJson};
use crate::middleware::rbac;
use crate::state::AppState;

/// POST /api/v1/attendance/sessions/start
pub async fn start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<StartSessionRequest>,
) -> Result<Json<ApiResponse<AttendanceSessionResponse>>, ApiError> {
    rbac::require_lecturer(&auth)?;

    let session = state.sessions.start(req.class_id, req.start_time).await?;
    info!(session_id = %session.id, lecturer_id = %auth.user_id, "Session opened via API");
    Ok(Json(ApiResponse::ok(session.into())))
}

/// PUT /api/v1/attendance/sessions/{id}/end
pub async fn end_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AttendanceSessionResponse>>, ApiError> {
    rbac::require_lecturer(&auth)?;

    let session = state.sessions.end(parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// GET /api/v1/attendance/sessions/{id}
pub async fn session_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionAttendanceResponse>>, ApiError> {
    rbac::require_lecturer_or_admin(&auth)?;

    let view = state.sessions.session_attendance(parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(view.into())))
}

/// POST /api/v1/attendance/check-in
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CheckInBody>,
) -> Result<Json<ApiResponse<AttendanceLogResponse>>, ApiError> {
    rbac::require_student(&auth)?;
    if req.student_id != auth.user_id {
        return Err(AppError::authorization("Students may only check in themselves").into());
    }

    let log = state
        .check_in
        .check_in(CheckInRequest {
            session_id: req.session_id,
            student_id: req.student_id,
            method: req.method,
            biometric_data: req.biometric_data,
            device_id: req.device_id,
            location: req.location,
        })
        .await?;
    Ok(Json(ApiResponse::ok(log.into())))
}

/// POST /api/v1/attendance/auto-checkin
pub async fn auto_checkin(
    State(state): State<AppState>,
    _caller: ServiceCaller,
    ValidJson(req): ValidJson<AutoCheckInBody>,
) -> Result<Json<ApiResponse<AttendanceLogResponse>>, ApiError> {
    let log = state
        .check_in
        .auto_check_in(AutoCheckInRequest {
            student_id: req.student_id,
            session_id: req.session_id,
            location: req.location,
            confidence: req.confidence,
            timestamp: req.timestamp.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok(Json(ApiResponse::ok(log.into())))
}
