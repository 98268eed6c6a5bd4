//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use rollcall_auth::AuthManager;
use rollcall_core::config::AppConfig;
use rollcall_database::StoreHealth;
use rollcall_service::{AttendanceSessionMachine, CheckInProcessor, ReportService};

/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Login, request authentication, refresh, and sign-out.
    pub auth: Arc<AuthManager>,

    // ── Attendance ───────────────────────────────────────────
    pub sessions: Arc<AttendanceSessionMachine>,
    pub check_in: Arc<CheckInProcessor>,
    pub reports: Arc<ReportService>,

    // ── Infrastructure ───────────────────────────────────────
    pub health: Arc<dyn StoreHealth>,
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .field("sessions", &self.sessions)
            .field("check_in", &self.check_in)
            .finish_non_exhaustive()
    }
}
