//! Device-bound sessions and the flows built on them.

pub mod manager;
pub mod registry;

pub use manager::{AuthManager, LoginOutcome, RefreshOutcome};
pub use registry::SessionRegistry;
