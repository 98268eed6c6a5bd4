//! Attendance session entity and status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an attendance window. `Ongoing` moves to `Completed`
/// exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Ongoing,
    Completed,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One class meeting's attendance window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Set when the session is completed.
    pub end_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

impl AttendanceSession {
    /// Build a new ongoing session.
    pub fn open(class_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            class_id,
            start_time,
            end_time: None,
            status: AttendanceStatus::Ongoing,
            created_at: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == AttendanceStatus::Ongoing
    }

    /// Apply the `ongoing -> completed` transition. Returns `false` when the
    /// session was already completed and nothing changed.
    pub fn complete(&mut self, end_time: DateTime<Utc>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.status = AttendanceStatus::Completed;
        self.end_time = Some(end_time);
        true
    }
}
