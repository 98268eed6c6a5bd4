//! Class and per-student attendance reports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_database::store::{AttendanceStore, ClassDirectory, UserDirectory};
use rollcall_entity::attendance::{AttendanceLog, CheckInMethod};
use rollcall_entity::user::UserRole;

/// Check-in counts per method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub face: i64,
    pub nfc: i64,
    pub ble: i64,
    pub geofence: i64,
}

impl MethodBreakdown {
    fn record(&mut self, method: CheckInMethod) {
        match method {
            CheckInMethod::Face => self.face += 1,
            CheckInMethod::Nfc => self.nfc += 1,
            CheckInMethod::Ble => self.ble += 1,
            CheckInMethod::Geofence => self.geofence += 1,
        }
    }
}

/// Aggregate attendance for a class over an optional start-time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub class_id: Uuid,
    pub total_sessions: i64,
    pub total_students: i64,
    /// Mean number of check-ins per session.
    pub average_attendance: f64,
    pub attendance_by_method: MethodBreakdown,
    pub anomalies: i64,
}

/// One student's attendance across every session of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub total_sessions: i64,
    pub attended_sessions: i64,
    pub attendance_rate: f64,
    pub anomalies: i64,
    pub last_check_in: Option<DateTime<Utc>>,
}

/// Read-only statistics over stored sessions and logs.
#[derive(Clone)]
pub struct ReportService {
    attendance: Arc<dyn AttendanceStore>,
    users: Arc<dyn UserDirectory>,
    classes: Arc<dyn ClassDirectory>,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService").finish_non_exhaustive()
    }
}

impl ReportService {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        users: Arc<dyn UserDirectory>,
        classes: Arc<dyn ClassDirectory>,
    ) -> Self {
        Self {
            attendance,
            users,
            classes,
        }
    }

    pub async fn class_report(
        &self,
        class_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<ClassReport> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::validation("Report range start is after its end"));
            }
        }
        self.ensure_class(class_id).await?;

        let sessions = self
            .attendance
            .list_sessions_for_class(class_id, from, to)
            .await?;
        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        let logs = self.attendance.list_logs_for_sessions(&ids).await?;
        let total_students = self.users.count_by_role(UserRole::Student).await?;

        let mut by_method = MethodBreakdown::default();
        for log in &logs {
            by_method.record(log.method);
        }

        Ok(ClassReport {
            class_id,
            total_sessions: sessions.len() as i64,
            total_students,
            average_attendance: ratio(logs.len(), sessions.len()),
            attendance_by_method: by_method,
            anomalies: count_anomalies(&logs),
        })
    }

    pub async fn student_report(&self, class_id: Uuid, student_id: Uuid) -> AppResult<StudentReport> {
        self.ensure_class(class_id).await?;

        let sessions = self
            .attendance
            .list_sessions_for_class(class_id, None, None)
            .await?;
        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        let logs: Vec<AttendanceLog> = self
            .attendance
            .list_logs_for_sessions(&ids)
            .await?
            .into_iter()
            .filter(|l| l.student_id == student_id)
            .collect();

        Ok(StudentReport {
            class_id,
            student_id,
            total_sessions: sessions.len() as i64,
            attended_sessions: logs.len() as i64,
            attendance_rate: ratio(logs.len(), sessions.len()),
            anomalies: count_anomalies(&logs),
            last_check_in: logs.iter().map(|l| l.checked_in_at).max(),
        })
    }

    async fn ensure_class(&self, class_id: Uuid) -> AppResult<()> {
        if !self.classes.class_exists(class_id).await? {
            return Err(AppError::not_found("Class not found"));
        }
        Ok(())
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn count_anomalies(logs: &[AttendanceLog]) -> i64 {
    logs.iter().filter(|l| l.is_anomaly).count() as i64
}
