//! # rollcall-service
//!
//! Attendance business logic: the session lifecycle, the check-in pipeline,
//! the biometric verifier client, notification fan-out, and reports.
//!
//! Services take their stores and collaborators as `Arc`s at construction.

pub mod attendance;
pub mod biometric;
pub mod context;
pub mod notification;
pub mod report;

#[cfg(test)]
mod testing;

pub use attendance::{
    AttendanceSessionMachine, AutoCheckInRequest, CheckInProcessor, CheckInRequest,
    SessionAttendance,
};
pub use biometric::{BiometricGateway, FaceMatch, GatewayError, HttpBiometricGateway};
pub use context::RequestContext;
pub use notification::{ChannelNotifier, NotificationFanOut, Notifier, TracingNotifier};
pub use report::{ClassReport, ReportService, StudentReport};
