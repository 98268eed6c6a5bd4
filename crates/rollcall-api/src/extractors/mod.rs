//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;
pub mod service;

pub use auth::AuthUser;
pub use json::ValidJson;
pub use service::ServiceCaller;
