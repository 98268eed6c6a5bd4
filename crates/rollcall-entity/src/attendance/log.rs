//! Attendance log entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::method::CheckInMethod;

/// A recorded check-in. Unique per `(session_id, student_id)` and immutable
/// once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceLog {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub method: CheckInMethod,
    /// In `[0, 1]`; `1.0` for non-biometric methods.
    pub confidence_score: f64,
    pub is_anomaly: bool,
    /// Client-reported hardware identifier, if any.
    pub device_id: Option<String>,
    pub location: Option<String>,
}

/// A check-in ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAttendanceLog {
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub method: CheckInMethod,
    pub confidence_score: f64,
    pub is_anomaly: bool,
    pub device_id: Option<String>,
    pub location: Option<String>,
}

impl NewAttendanceLog {
    pub fn into_log(self) -> AttendanceLog {
        AttendanceLog {
            id: Uuid::new_v4(),
            session_id: self.session_id,
            student_id: self.student_id,
            checked_in_at: self.checked_in_at,
            method: self.method,
            confidence_score: self.confidence_score,
            is_anomaly: self.is_anomaly,
            device_id: self.device_id,
            location: self.location,
        }
    }
}
