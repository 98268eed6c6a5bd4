//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rollcall_entity::attendance::{AttendanceLog, AttendanceSession, AttendanceStatus, CheckInMethod};
use rollcall_entity::user::{User, UserRole};
use rollcall_service::SessionAttendance;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_verified: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_verified: user.is_verified,
        }
    }
}

/// Credentials the client must replay: both tokens and the device id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    /// Only present when the refresh token was rotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSessionResponse {
    pub id: Uuid,
    pub class_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
}

impl From<AttendanceSession> for AttendanceSessionResponse {
    fn from(session: AttendanceSession) -> Self {
        Self {
            id: session.id,
            class_id: session.class_id,
            start_time: session.start_time,
            end_time: session.end_time,
            status: session.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLogResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub method: CheckInMethod,
    pub confidence_score: f64,
    pub is_anomaly: bool,
    pub device_id: Option<String>,
    pub location: Option<String>,
}

impl From<AttendanceLog> for AttendanceLogResponse {
    fn from(log: AttendanceLog) -> Self {
        Self {
            id: log.id,
            session_id: log.session_id,
            student_id: log.student_id,
            checked_in_at: log.checked_in_at,
            method: log.method,
            confidence_score: log.confidence_score,
            is_anomaly: log.is_anomaly,
            device_id: log.device_id,
            location: log.location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAttendanceResponse {
    pub session: AttendanceSessionResponse,
    pub logs: Vec<AttendanceLogResponse>,
}

impl From<SessionAttendance> for SessionAttendanceResponse {
    fn from(view: SessionAttendance) -> Self {
        Self {
            session: view.session.into(),
            logs: view.logs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutAllResponse {
    pub sessions_closed: u64,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    pub version: String,
    pub store: String,
    pub uptime_seconds: u64,
}
