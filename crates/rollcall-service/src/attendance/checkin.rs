//! The check-in pipeline: session gate, dedup, scoring, persistence, follow-up.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_database::store::{AttendanceStore, ClassDirectory, InsertOutcome, UserDirectory};
use rollcall_entity::attendance::{
    AttendanceLog, AttendanceSession, CheckInMethod, NewAttendanceLog,
};
use rollcall_entity::class::Class;
use rollcall_entity::user::{User, UserRole};

use crate::biometric::{BiometricGateway, GatewayError};
use crate::notification::{NotificationFanOut, message};

use super::rules;

/// A check-in submitted by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub method: CheckInMethod,
    /// Base64 face sample; required for [`CheckInMethod::Face`].
    pub biometric_data: Option<String>,
    pub device_id: Option<String>,
    pub location: Option<String>,
}

/// A check-in pushed by the recognition pipeline with its own score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoCheckInRequest {
    pub student_id: Uuid,
    pub session_id: Uuid,
    pub location: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Turns check-in events into deduplicated, anomaly-flagged attendance logs.
#[derive(Clone)]
pub struct CheckInProcessor {
    attendance: Arc<dyn AttendanceStore>,
    users: Arc<dyn UserDirectory>,
    classes: Arc<dyn ClassDirectory>,
    gateway: Arc<dyn BiometricGateway>,
    gateway_timeout: Duration,
    fanout: NotificationFanOut,
}

impl std::fmt::Debug for CheckInProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInProcessor")
            .field("gateway_timeout", &self.gateway_timeout)
            .field("fanout", &self.fanout)
            .finish_non_exhaustive()
    }
}

impl CheckInProcessor {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        users: Arc<dyn UserDirectory>,
        classes: Arc<dyn ClassDirectory>,
        gateway: Arc<dyn BiometricGateway>,
        gateway_timeout: Duration,
        fanout: NotificationFanOut,
    ) -> Self {
        Self {
            attendance,
            users,
            classes,
            gateway,
            gateway_timeout,
            fanout,
        }
    }

    /// Record a student's check-in.
    pub async fn check_in(&self, request: CheckInRequest) -> AppResult<AttendanceLog> {
        let session = self.open_session(request.session_id).await?;
        self.ensure_not_checked_in(session.id, request.student_id)
            .await?;

        let confidence = self.score(&request).await?;
        let log = self
            .persist(NewAttendanceLog {
                session_id: session.id,
                student_id: request.student_id,
                checked_in_at: Utc::now(),
                method: request.method,
                confidence_score: confidence,
                is_anomaly: rules::is_anomalous(confidence),
                device_id: request.device_id,
                location: request.location,
            })
            .await?;

        self.after_commit(&session, &log).await;
        Ok(log)
    }

    /// Record a check-in scored upstream by the recognition pipeline.
    pub async fn auto_check_in(&self, request: AutoCheckInRequest) -> AppResult<AttendanceLog> {
        if request.location.trim().is_empty() {
            return Err(AppError::validation("Location is required"));
        }
        if !rules::is_valid_confidence(request.confidence) {
            return Err(AppError::validation("Confidence must be between 0 and 1"));
        }

        let session = self.open_session(request.session_id).await?;
        self.ensure_not_checked_in(session.id, request.student_id)
            .await?;

        match self.users.find_by_id(request.student_id).await? {
            Some(user) if user.role == UserRole::Student => {}
            _ => return Err(AppError::not_found("Student not found")),
        }

        let log = self
            .persist(NewAttendanceLog {
                session_id: session.id,
                student_id: request.student_id,
                checked_in_at: request.timestamp,
                method: CheckInMethod::Face,
                confidence_score: request.confidence,
                is_anomaly: rules::is_anomalous(request.confidence),
                device_id: None,
                location: Some(request.location),
            })
            .await?;

        self.after_commit(&session, &log).await;
        Ok(log)
    }

    async fn open_session(&self, session_id: Uuid) -> AppResult<AttendanceSession> {
        match self.attendance.find_session(session_id).await? {
            Some(session) if session.is_open() => Ok(session),
            _ => Err(AppError::not_found(
                "Invalid or completed attendance session",
            )),
        }
    }

    /// Early rejection that saves a verifier round-trip. The insert below
    /// stays the authority on uniqueness.
    async fn ensure_not_checked_in(&self, session_id: Uuid, student_id: Uuid) -> AppResult<()> {
        if self
            .attendance
            .find_log(session_id, student_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Student already checked in"));
        }
        Ok(())
    }

    async fn score(&self, request: &CheckInRequest) -> AppResult<f64> {
        if !request.method.requires_biometric() {
            return Ok(rules::FULL_CONFIDENCE);
        }

        let sample = request
            .biometric_data
            .as_deref()
            .map(strip_data_url)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("Biometric data is required for face check-in"))?;
        BASE64
            .decode(sample)
            .map_err(|_| AppError::validation("Biometric data must be base64 encoded"))?;

        let verdict = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.verify_face(sample, request.student_id),
        )
        .await
        .map_err(|_| GatewayError::Timeout)
        .and_then(|r| r)
        .inspect_err(|e| {
            warn!(student_id = %request.student_id, error = %e, "Face verification failed");
        })?;

        if !rules::is_valid_confidence(verdict.confidence) {
            return Err(GatewayError::InvalidResponse(format!(
                "confidence {} outside [0, 1]",
                verdict.confidence
            ))
            .into());
        }
        Ok(verdict.confidence)
    }

    async fn persist(&self, log: NewAttendanceLog) -> AppResult<AttendanceLog> {
        let (session_id, student_id) = (log.session_id, log.student_id);
        match self.attendance.insert_log(log).await? {
            InsertOutcome::Inserted(log) => {
                info!(
                    session_id = %log.session_id,
                    student_id = %log.student_id,
                    method = %log.method,
                    confidence = log.confidence_score,
                    anomaly = log.is_anomaly,
                    "Check-in recorded"
                );
                Ok(log)
            }
            InsertOutcome::Duplicate => {
                warn!(session_id = %session_id, student_id = %student_id, "Duplicate check-in rejected");
                Err(AppError::conflict("Student already checked in"))
            }
            InsertOutcome::SessionClosed => Err(AppError::not_found(
                "Invalid or completed attendance session",
            )),
        }
    }

    /// Runs once the log is durable. Nothing here can fail the check-in:
    /// lookups that fail drop the affected notification and delivery happens
    /// on a background task.
    async fn after_commit(&self, session: &AttendanceSession, log: &AttendanceLog) {
        let mut outgoing = vec![message::check_in_confirmed(log)];

        let class = self.lookup_class(session).await;
        let student = self.lookup_student(log.student_id).await;

        if let Some(class) = &class {
            match &student {
                Some(student) => {
                    outgoing.push(message::check_in_recorded(class.lecturer_id, student, log));
                    if log.is_anomaly {
                        outgoing.push(message::anomaly_detected(class.lecturer_id, student, log));
                    }
                }
                None => warn!(
                    student_id = %log.student_id,
                    "Student record missing, skipping lecturer notifications"
                ),
            }
        }
        if log.is_anomaly {
            warn!(
                session_id = %log.session_id,
                student_id = %log.student_id,
                confidence = log.confidence_score,
                "Anomalous check-in"
            );
        }

        if let Some((rate, attended, total)) = self.running_rate(session.id).await {
            if rules::is_low_attendance(rate) {
                warn!(session_id = %session.id, rate, attended, total, "Attendance below threshold");
                if let Some(class) = &class {
                    outgoing.push(message::low_attendance(
                        class.lecturer_id,
                        session.id,
                        rate,
                        attended,
                        total,
                    ));
                }
            }
        }

        self.fanout.dispatch(outgoing);
    }

    async fn lookup_class(&self, session: &AttendanceSession) -> Option<Class> {
        match self.classes.find_by_id(session.class_id).await {
            Ok(Some(class)) => Some(class),
            Ok(None) => {
                warn!(class_id = %session.class_id, "Class missing, skipping lecturer notifications");
                None
            }
            Err(e) => {
                warn!(class_id = %session.class_id, error = %e, "Class lookup failed");
                None
            }
        }
    }

    async fn lookup_student(&self, student_id: Uuid) -> Option<User> {
        self.users
            .find_by_id(student_id)
            .await
            .inspect_err(|e| warn!(student_id = %student_id, error = %e, "Student lookup failed"))
            .ok()
            .flatten()
    }

    /// `(rate, attended, total_students)` for the session, recomputed from
    /// the store on every call.
    async fn running_rate(&self, session_id: Uuid) -> Option<(f64, i64, i64)> {
        let attended = self
            .attendance
            .count_logs(session_id)
            .await
            .inspect_err(|e| warn!(session_id = %session_id, error = %e, "Check-in count failed"))
            .ok()?;
        let total = self
            .users
            .count_by_role(UserRole::Student)
            .await
            .inspect_err(|e| warn!(error = %e, "Student count failed"))
            .ok()?;
        rules::attendance_rate(attended, total).map(|rate| (rate, attended, total))
    }
}

/// Accept `data:image/...;base64,<payload>` as well as a bare payload.
fn strip_data_url(sample: &str) -> &str {
    let sample = sample.trim();
    match sample.split_once("base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => sample,
    }
}
