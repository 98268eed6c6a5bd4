//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use rollcall_entity::attendance::CheckInMethod;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of `POST /attendance/sessions/start`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub class_id: Uuid,
    /// Defaults to now.
    pub start_time: Option<DateTime<Utc>>,
}

/// Body of `POST /attendance/check-in`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInBody {
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub method: CheckInMethod,
    pub biometric_data: Option<String>,
    #[validate(length(max = 255))]
    pub device_id: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

/// Body of `POST /attendance/auto-checkin`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AutoCheckInBody {
    pub student_id: Uuid,
    pub session_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: f64,
    /// When the recognition pipeline saw the student. Defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Optional start-time bounds for class reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
