//! Store traits shared by the PostgreSQL repositories and [`MemoryStore`].
//!
//! Every method that the concurrency invariants rely on is a single atomic
//! operation on the implementation side; callers never compose them into
//! read-then-write sequences.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rollcall_core::result::AppResult;
use rollcall_entity::attendance::{AttendanceLog, AttendanceSession, NewAttendanceLog};
use rollcall_entity::class::Class;
use rollcall_entity::session::{NewSession, Session};
use rollcall_entity::user::{User, UserRole};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    AttendanceRepository, ClassRepository, SessionRepository, UserRepository,
};

/// Persistence for device-bound login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Deactivate every active session of `new.user_id` and insert `new` as
    /// the only active one, atomically per user.
    async fn activate(&self, new: NewSession) -> AppResult<Session>;

    /// The active session for the exact `(user_id, device_id)` pair.
    async fn find_active(&self, user_id: Uuid, device_id: &str) -> AppResult<Option<Session>>;

    /// Bump `last_activity` on the active session for the pair. Returns
    /// `false` when no such active session exists.
    async fn touch(&self, user_id: Uuid, device_id: &str, at: DateTime<Utc>) -> AppResult<bool>;

    /// Replace the stored token digests of an active session. `refresh_hash`
    /// of `None` keeps the current refresh digest.
    async fn update_tokens(
        &self,
        session_id: Uuid,
        access_hash: &str,
        refresh_hash: Option<&str>,
    ) -> AppResult<bool>;

    /// Deactivate the session for the pair. Returns `false` if it was not active.
    async fn deactivate(&self, user_id: Uuid, device_id: &str) -> AppResult<bool>;

    /// Deactivate every active session of the user; returns how many changed.
    async fn deactivate_all(&self, user_id: Uuid) -> AppResult<u64>;

    async fn count_active(&self, user_id: Uuid) -> AppResult<i64>;
}

/// Result of an atomic check-in insert.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(AttendanceLog),
    /// A log for the `(session_id, student_id)` pair already exists.
    Duplicate,
    /// The attendance session is missing or no longer ongoing.
    SessionClosed,
}

/// Persistence for attendance sessions and check-in logs.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn create_session(&self, session: AttendanceSession) -> AppResult<AttendanceSession>;

    async fn find_session(&self, id: Uuid) -> AppResult<Option<AttendanceSession>>;

    /// Move an ongoing session to completed. `None` means the session was not
    /// ongoing (already completed or unknown).
    async fn complete_session(
        &self,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceSession>>;

    async fn find_log(&self, session_id: Uuid, student_id: Uuid)
    -> AppResult<Option<AttendanceLog>>;

    /// Insert the log only if its session is ongoing and the pair is new,
    /// as one atomic step.
    async fn insert_log(&self, log: NewAttendanceLog) -> AppResult<InsertOutcome>;

    async fn count_logs(&self, session_id: Uuid) -> AppResult<i64>;

    async fn list_logs(&self, session_id: Uuid) -> AppResult<Vec<AttendanceLog>>;

    /// Sessions of a class, optionally bounded by start time, oldest first.
    async fn list_sessions_for_class(
        &self,
        class_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<AttendanceSession>>;

    async fn list_logs_for_sessions(&self, session_ids: &[Uuid]) -> AppResult<Vec<AttendanceLog>>;
}

/// Read access to user identities.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64>;
}

/// Read access to classes.
#[async_trait]
pub trait ClassDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>>;

    async fn class_exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Liveness probe for the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Handles to every store, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    pub sessions: Arc<dyn SessionStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub users: Arc<dyn UserDirectory>,
    pub classes: Arc<dyn ClassDirectory>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool: PgPool = db.pool().clone();
        Self {
            sessions: Arc::new(SessionRepository::new(pool.clone())),
            attendance: Arc::new(AttendanceRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            classes: Arc::new(ClassRepository::new(pool)),
            health: Arc::new(db),
        }
    }

    /// All stores served by one in-process [`MemoryStore`].
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            sessions: store.clone(),
            attendance: store.clone(),
            users: store.clone(),
            classes: store.clone(),
            health: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
