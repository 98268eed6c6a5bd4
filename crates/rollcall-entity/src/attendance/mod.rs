//! Attendance session and check-in log entities.

pub mod log;
pub mod method;
pub mod session;

pub use log::{AttendanceLog, NewAttendanceLog};
pub use method::CheckInMethod;
pub use session::{AttendanceSession, AttendanceStatus};
