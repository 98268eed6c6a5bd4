//! Attendance session lifecycle and check-in processing.

pub mod checkin;
pub mod rules;
pub mod session;

pub use checkin::{AutoCheckInRequest, CheckInProcessor, CheckInRequest};
pub use rules::{ANOMALY_THRESHOLD, LOW_ATTENDANCE_THRESHOLD};
pub use session::{AttendanceSessionMachine, SessionAttendance};
