//! # rollcall-core
//!
//! Core crate for Rollcall. Holds the configuration schemas and the unified
//! error type shared by every other crate in the workspace.
//!
//! This crate has **no** internal dependencies on other Rollcall crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
