//! # rollcall-api
//!
//! HTTP API layer for Rollcall built on Axum.
//!
//! Provides the REST endpoints, the access-token and device-id extractor,
//! role guards, DTOs, and the mapping from `AppError` kinds to status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
