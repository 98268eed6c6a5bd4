//! # rollcall-database
//!
//! Persistence for Rollcall: the store traits the auth and attendance
//! components depend on, their PostgreSQL implementations, and an
//! in-process store with the same atomicity guarantees.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    AttendanceStore, ClassDirectory, InsertOutcome, SessionStore, StoreHealth, Stores,
    UserDirectory,
};
