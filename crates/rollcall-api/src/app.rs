//! Wires stores, gateway, and notifiers into the shared `AppState`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tracing::info;

use rollcall_auth::{AuthManager, CredentialHasher, SessionRegistry, TokenAuthority};
use rollcall_core::config::AppConfig;
use rollcall_core::result::AppResult;
use rollcall_database::Stores;
use rollcall_service::{
    AttendanceSessionMachine, BiometricGateway, CheckInProcessor, NotificationFanOut,
    ReportService,
};

use crate::router::build_router;
use crate::state::AppState;

/// Build the shared state from already-connected stores.
pub fn build_state(
    config: AppConfig,
    stores: Stores,
    gateway: Arc<dyn BiometricGateway>,
    fanout: NotificationFanOut,
) -> AppResult<AppState> {
    let authority = Arc::new(TokenAuthority::new(&config.auth)?);
    let registry = Arc::new(SessionRegistry::new(stores.sessions.clone()));
    let hasher = Arc::new(CredentialHasher::new());
    let auth = Arc::new(AuthManager::new(
        authority,
        registry,
        hasher,
        stores.users.clone(),
        &config.auth,
    ));

    let sessions = Arc::new(AttendanceSessionMachine::new(
        stores.attendance.clone(),
        stores.classes.clone(),
        fanout.clone(),
    ));
    let check_in = Arc::new(CheckInProcessor::new(
        stores.attendance.clone(),
        stores.users.clone(),
        stores.classes.clone(),
        gateway,
        Duration::from_millis(config.biometric.timeout_ms),
        fanout,
    ));
    let reports = Arc::new(ReportService::new(
        stores.attendance,
        stores.users,
        stores.classes,
    ));

    info!(
        service_key = config.attendance.service_api_key.is_some(),
        "Application state built"
    );

    Ok(AppState {
        config: Arc::new(config),
        auth,
        sessions,
        check_in,
        reports,
        health: stores.health,
        started_at: Instant::now(),
    })
}

/// The full router for `state`.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
