//! Route definitions for the Rollcall HTTP API.
//!
//! Every route is mounted under `/api/v1` and receives `AppState` through
//! Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(attendance_routes())
        .merge(report_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, refresh, sign-out
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", get(handlers::auth::refresh_token))
        .route("/auth/signout", post(handlers::auth::signout))
        .route("/auth/signout-all", post(handlers::auth::signout_all))
}

/// Session lifecycle and check-ins
fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attendance/sessions/start",
            post(handlers::attendance::start_session),
        )
        .route(
            "/attendance/sessions/{id}",
            get(handlers::attendance::session_attendance),
        )
        .route(
            "/attendance/sessions/{id}/end",
            put(handlers::attendance::end_session),
        )
        .route("/attendance/check-in", post(handlers::attendance::check_in))
        .route(
            "/attendance/auto-checkin",
            post(handlers::attendance::auto_checkin),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports/classes/{class_id}",
            get(handlers::report::class_report),
        )
        .route(
            "/reports/classes/{class_id}/students/{student_id}",
            get(handlers::report::student_report),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
