//! Device-bound login session entities.

pub mod model;

pub use model::{NewSession, Session};
