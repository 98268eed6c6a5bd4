//! Attendance session lifecycle: `ongoing -> completed`, exactly once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_database::store::{AttendanceStore, ClassDirectory};
use rollcall_entity::attendance::{AttendanceLog, AttendanceSession};

use crate::notification::{NotificationFanOut, message};

/// A session together with every check-in recorded against it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionAttendance {
    pub session: AttendanceSession,
    pub logs: Vec<AttendanceLog>,
}

/// Opens and closes attendance windows.
#[derive(Clone)]
pub struct AttendanceSessionMachine {
    attendance: Arc<dyn AttendanceStore>,
    classes: Arc<dyn ClassDirectory>,
    fanout: NotificationFanOut,
}

impl std::fmt::Debug for AttendanceSessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceSessionMachine")
            .field("fanout", &self.fanout)
            .finish_non_exhaustive()
    }
}

impl AttendanceSessionMachine {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        classes: Arc<dyn ClassDirectory>,
        fanout: NotificationFanOut,
    ) -> Self {
        Self {
            attendance,
            classes,
            fanout,
        }
    }

    /// Open a session for `class_id`. `start_time` defaults to now.
    pub async fn start(
        &self,
        class_id: Uuid,
        start_time: Option<DateTime<Utc>>,
    ) -> AppResult<AttendanceSession> {
        let class = self
            .classes
            .find_by_id(class_id)
            .await?
            .ok_or_else(|| AppError::not_found("Class not found"))?;

        let session = self
            .attendance
            .create_session(AttendanceSession::open(
                class.id,
                start_time.unwrap_or_else(Utc::now),
            ))
            .await?;

        info!(session_id = %session.id, class_id = %class.id, "Attendance session started");
        self.fanout
            .dispatch(vec![message::session_started(&class, &session)]);
        Ok(session)
    }

    /// Close an ongoing session. Unknown sessions are `NotFound`; a session
    /// that is already completed is a `Conflict` and stays unchanged.
    pub async fn end(&self, session_id: Uuid) -> AppResult<AttendanceSession> {
        let Some(session) = self
            .attendance
            .complete_session(session_id, Utc::now())
            .await?
        else {
            return match self.attendance.find_session(session_id).await? {
                Some(_) => Err(AppError::conflict("Attendance session already completed")),
                None => Err(AppError::not_found("Attendance session not found")),
            };
        };

        info!(session_id = %session.id, class_id = %session.class_id, "Attendance session ended");
        self.notify_ended(&session).await;
        Ok(session)
    }

    /// Whether check-ins are currently accepted. Unknown sessions are closed.
    pub async fn is_open(&self, session_id: Uuid) -> AppResult<bool> {
        Ok(self
            .attendance
            .find_session(session_id)
            .await?
            .is_some_and(|s| s.is_open()))
    }

    pub async fn session_attendance(&self, session_id: Uuid) -> AppResult<SessionAttendance> {
        let session = self
            .attendance
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Attendance session not found"))?;
        let logs = self.attendance.list_logs(session_id).await?;
        Ok(SessionAttendance { session, logs })
    }

    async fn notify_ended(&self, session: &AttendanceSession) {
        let class = match self.classes.find_by_id(session.class_id).await {
            Ok(Some(class)) => class,
            Ok(None) => {
                warn!(session_id = %session.id, "Class missing, skipping end notification");
                return;
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Class lookup failed, skipping end notification");
                return;
            }
        };
        let attended = match self.attendance.count_logs(session.id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Could not count check-ins for end notification");
                0
            }
        };
        self.fanout
            .dispatch(vec![message::session_ended(&class, session, attended)]);
    }
}
