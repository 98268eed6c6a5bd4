//! HTTP-level integration tests against the in-memory store.

mod attendance_test;
mod auth_test;
mod helpers;
