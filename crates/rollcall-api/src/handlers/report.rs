//! Attendance report handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use rollcall_service::{ClassReport, StudentReport};

use crate::dto::request::ReportRangeQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_uuid;
use crate::middleware::rbac;
use crate::state::AppState;

/// GET /api/v1/reports/classes/{class_id}
pub async fn class_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(class_id): Path<String>,
    Query(range): Query<ReportRangeQuery>,
) -> Result<Json<ApiResponse<ClassReport>>, ApiError> {
    rbac::require_lecturer_or_admin(&auth)?;

    let report = state
        .reports
        .class_report(parse_uuid(&class_id)?, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/v1/reports/classes/{class_id}/students/{student_id}
pub async fn student_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((class_id, student_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<StudentReport>>, ApiError> {
    let student_id = parse_uuid(&student_id)?;
    rbac::require_self_or_staff(&auth, student_id)?;

    let report = state
        .reports
        .student_report(parse_uuid(&class_id)?, student_id)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
