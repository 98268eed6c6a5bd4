//! In-process store using a Tokio mutex, for single-node deployments and tests.
//!
//! Each trait method holds the lock for its whole body, which gives the same
//! per-user and per-`(session, student)` atomicity the PostgreSQL schema
//! enforces with row locks and unique keys.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_core::result::AppResult;
use rollcall_entity::attendance::{AttendanceLog, AttendanceSession, NewAttendanceLog};
use rollcall_entity::class::Class;
use rollcall_entity::session::{NewSession, Session};
use rollcall_entity::user::{User, UserRole};

use crate::store::{
    AttendanceStore, ClassDirectory, InsertOutcome, SessionStore, StoreHealth, UserDirectory,
};

#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<Uuid, User>,
    classes: HashMap<Uuid, Class>,
    /// Append-only; deactivated rows stay for audit.
    sessions: Vec<Session>,
    attendance_sessions: HashMap<Uuid, AttendanceSession>,
    logs: Vec<AttendanceLog>,
    /// Unique key over `(session_id, student_id)`.
    log_keys: HashSet<(Uuid, Uuid)>,
}

/// Store that keeps every table in memory behind one lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Emails are unique, case-insensitively.
    pub async fn insert_user(&self, user: User) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let email = user.email.to_lowercase();
        if state.users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(AppError::conflict("Email already in use"));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Add a class. Its lecturer must already exist.
    pub async fn insert_class(&self, class: Class) -> AppResult<Class> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&class.lecturer_id) {
            return Err(AppError::not_found("Lecturer not found"));
        }
        state.classes.insert(class.id, class.clone());
        Ok(class)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn activate(&self, new: NewSession) -> AppResult<Session> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&new.user_id) {
            return Err(AppError::not_found("User not found"));
        }
        if state.sessions.iter().any(|s| s.device_id == new.device_id) {
            return Err(AppError::conflict("Device id already issued"));
        }

        let mut superseded = 0usize;
        for session in state
            .sessions
            .iter_mut()
            .filter(|s| s.user_id == new.user_id && s.is_active)
        {
            session.is_active = false;
            superseded += 1;
        }

        let session = new.into_session(Utc::now());
        debug!(user_id = %session.user_id, superseded, "Activated session in memory");
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_active(&self, user_id: Uuid, device_id: &str) -> AppResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .find(|s| s.matches(user_id, device_id))
            .cloned())
    }

    async fn touch(&self, user_id: Uuid, device_id: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .sessions
            .iter_mut()
            .find(|s| s.matches(user_id, device_id))
        {
            Some(session) => {
                session.last_activity = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_tokens(
        &self,
        session_id: Uuid,
        access_hash: &str,
        refresh_hash: Option<&str>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.is_active)
        {
            Some(session) => {
                session.access_token_hash = access_hash.to_string();
                if let Some(refresh_hash) = refresh_hash {
                    session.refresh_token_hash = refresh_hash.to_string();
                }
                session.last_activity = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, user_id: Uuid, device_id: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .sessions
            .iter_mut()
            .find(|s| s.matches(user_id, device_id))
        {
            Some(session) => {
                session.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_all(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0u64;
        for session in state
            .sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.is_active)
        {
            session.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count_active(&self, user_id: Uuid) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active)
            .count() as i64)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn create_session(&self, session: AttendanceSession) -> AppResult<AttendanceSession> {
        let mut state = self.state.lock().await;
        if !state.classes.contains_key(&session.class_id) {
            return Err(AppError::not_found("Class not found"));
        }
        state.attendance_sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<AttendanceSession>> {
        let state = self.state.lock().await;
        Ok(state.attendance_sessions.get(&id).cloned())
    }

    async fn complete_session(
        &self,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceSession>> {
        let mut state = self.state.lock().await;
        let Some(session) = state.attendance_sessions.get_mut(&id) else {
            return Ok(None);
        };
        if session.complete(end_time) {
            Ok(Some(session.clone()))
        } else {
            Ok(None)
        }
    }

    async fn find_log(
        &self,
        session_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<AttendanceLog>> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .iter()
            .find(|l| l.session_id == session_id && l.student_id == student_id)
            .cloned())
    }

    async fn insert_log(&self, log: NewAttendanceLog) -> AppResult<InsertOutcome> {
        let mut state = self.state.lock().await;
        let key = (log.session_id, log.student_id);

        if state.log_keys.contains(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        let open = state
            .attendance_sessions
            .get(&log.session_id)
            .is_some_and(AttendanceSession::is_open);
        if !open {
            return Ok(InsertOutcome::SessionClosed);
        }

        let row = log.into_log();
        state.log_keys.insert(key);
        state.logs.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn count_logs(&self, session_id: Uuid) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .iter()
            .filter(|l| l.session_id == session_id)
            .count() as i64)
    }

    async fn list_logs(&self, session_id: Uuid) -> AppResult<Vec<AttendanceLog>> {
        let state = self.state.lock().await;
        let mut logs: Vec<_> = state
            .logs
            .iter()
            .filter(|l| l.session_id == session_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.checked_in_at);
        Ok(logs)
    }

    async fn list_sessions_for_class(
        &self,
        class_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<AttendanceSession>> {
        let state = self.state.lock().await;
        let mut sessions: Vec<_> = state
            .attendance_sessions
            .values()
            .filter(|s| s.class_id == class_id)
            .filter(|s| from.is_none_or(|from| s.start_time >= from))
            .filter(|s| to.is_none_or(|to| s.start_time <= to))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn list_logs_for_sessions(&self, session_ids: &[Uuid]) -> AppResult<Vec<AttendanceLog>> {
        let state = self.state.lock().await;
        let mut logs: Vec<_> = state
            .logs
            .iter()
            .filter(|l| session_ids.contains(&l.session_id))
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.checked_in_at);
        Ok(logs)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        let email = email.to_lowercase();
        Ok(state
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.users.values().filter(|u| u.role == role).count() as i64)
    }
}

#[async_trait]
impl ClassDirectory for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>> {
        let state = self.state.lock().await;
        Ok(state.classes.get(&id).cloned())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
