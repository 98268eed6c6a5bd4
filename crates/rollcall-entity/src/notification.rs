//! Outgoing notification payloads.
//!
//! Notifications are handed to delivery channels and not stored by the
//! attendance core.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// To the lecturer: an attendance session was opened.
    SessionStarted,
    /// To the lecturer: an attendance session was closed.
    SessionEnded,
    /// To the student: their check-in was recorded.
    CheckInConfirmed,
    /// To the lecturer: a student checked in.
    CheckInRecorded,
    /// To the lecturer: a check-in scored below the trust threshold.
    AnomalyDetected,
    /// To the lecturer: the running attendance rate dropped below threshold.
    LowAttendance,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::SessionEnded => "session_ended",
            Self::CheckInConfirmed => "check_in_confirmed",
            Self::CheckInRecorded => "check_in_recorded",
            Self::AnomalyDetected => "anomaly_detected",
            Self::LowAttendance => "low_attendance",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed notification for one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub recipient_id: Uuid,
    pub title: String,
    pub message: String,
    /// Structured data for clients (session id, scores, rates).
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        recipient_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            recipient_id,
            title: title.into(),
            message: message.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}
