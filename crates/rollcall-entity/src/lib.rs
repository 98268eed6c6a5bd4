//! # rollcall-entity
//!
//! Row types and value enums for users, classes, device-bound sessions,
//! attendance sessions, attendance logs, and outgoing notifications.

pub mod attendance;
pub mod class;
pub mod notification;
pub mod session;
pub mod user;
