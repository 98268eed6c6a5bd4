//! Attendance statistics over a class's sessions.

pub mod attendance;

pub use attendance::{ClassReport, MethodBreakdown, ReportService, StudentReport};
