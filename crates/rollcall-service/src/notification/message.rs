//! Builders for the notifications the attendance flow emits.

use serde_json::json;
use uuid::Uuid;

use rollcall_entity::attendance::{AttendanceLog, AttendanceSession};
use rollcall_entity::class::Class;
use rollcall_entity::notification::{Notification, NotificationKind};
use rollcall_entity::user::User;

pub fn session_started(class: &Class, session: &AttendanceSession) -> Notification {
    Notification::new(
        NotificationKind::SessionStarted,
        class.lecturer_id,
        "Attendance Session Started",
        format!("Attendance is open for {}", class.name),
        json!({
            "session_id": session.id,
            "class_id": class.id,
            "start_time": session.start_time,
        }),
    )
}

pub fn session_ended(class: &Class, session: &AttendanceSession, attended: i64) -> Notification {
    Notification::new(
        NotificationKind::SessionEnded,
        class.lecturer_id,
        "Attendance Session Ended",
        format!("Attendance for {} closed with {attended} check-ins", class.name),
        json!({
            "session_id": session.id,
            "class_id": class.id,
            "end_time": session.end_time,
            "attended": attended,
        }),
    )
}

/// To the student whose check-in was recorded.
pub fn check_in_confirmed(log: &AttendanceLog) -> Notification {
    Notification::new(
        NotificationKind::CheckInConfirmed,
        log.student_id,
        "Check-in Confirmed",
        format!("Your attendance was recorded via {}", log.method),
        json!({
            "session_id": log.session_id,
            "log_id": log.id,
            "method": log.method,
            "checked_in_at": log.checked_in_at,
        }),
    )
}

pub fn check_in_recorded(lecturer_id: Uuid, student: &User, log: &AttendanceLog) -> Notification {
    Notification::new(
        NotificationKind::CheckInRecorded,
        lecturer_id,
        "Student Checked In",
        format!("{} checked in via {}", student.full_name, log.method),
        json!({
            "session_id": log.session_id,
            "student_id": log.student_id,
            "method": log.method,
            "confidence_score": log.confidence_score,
        }),
    )
}

pub fn anomaly_detected(lecturer_id: Uuid, student: &User, log: &AttendanceLog) -> Notification {
    Notification::new(
        NotificationKind::AnomalyDetected,
        lecturer_id,
        "Anomaly Detected",
        format!(
            "Check-in by {} scored {:.2} and needs review",
            student.full_name, log.confidence_score
        ),
        json!({
            "session_id": log.session_id,
            "student_id": log.student_id,
            "log_id": log.id,
            "method": log.method,
            "confidence_score": log.confidence_score,
        }),
    )
}

pub fn low_attendance(
    lecturer_id: Uuid,
    session_id: Uuid,
    rate: f64,
    attended: i64,
    total_students: i64,
) -> Notification {
    Notification::new(
        NotificationKind::LowAttendance,
        lecturer_id,
        "Low Attendance",
        format!(
            "Attendance is at {:.0}% ({attended} of {total_students})",
            rate * 100.0
        ),
        json!({
            "session_id": session_id,
            "attendance_rate": rate,
            "attended": attended,
            "total_students": total_students,
        }),
    )
}
