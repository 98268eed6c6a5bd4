//! PostgreSQL repository implementations of the store traits.

pub mod attendance;
pub mod class;
pub mod session;
pub mod user;

pub use attendance::AttendanceRepository;
pub use class::ClassRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
