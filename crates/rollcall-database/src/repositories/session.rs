//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rollcall_core::error::{AppError, ErrorKind};
use rollcall_core::result::AppResult;
use rollcall_entity::session::{NewSession, Session};

use crate::store::SessionStore;

/// PostgreSQL implementation of [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn activate(&self, new: NewSession) -> AppResult<Session> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin session transaction"))?;

        // Row lock on the user serializes concurrent logins for that user.
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(new.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("Failed to lock user for session creation"))?;
        if locked.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(new.user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to deactivate previous sessions"))?;

        let row = new.into_session(Utc::now());
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions \
             (id, user_id, device_id, access_token_hash, refresh_token_hash, is_active, last_activity, created_at) \
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7) \
             RETURNING *",
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.device_id)
        .bind(&row.access_token_hash)
        .bind(&row.refresh_token_hash)
        .bind(row.last_activity)
        .bind(row.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("sessions_one_active_per_user") =>
            {
                AppError::conflict("Another login for this user is in progress")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert session", e),
        })?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit session transaction"))?;

        Ok(session)
    }

    async fn find_active(&self, user_id: Uuid, device_id: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = $1 AND device_id = $2 AND is_active",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find session"))
    }

    async fn touch(&self, user_id: Uuid, device_id: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET last_activity = $3 \
             WHERE user_id = $1 AND device_id = $2 AND is_active",
        )
        .bind(user_id)
        .bind(device_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update session activity"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_tokens(
        &self,
        session_id: Uuid,
        access_hash: &str,
        refresh_hash: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET access_token_hash = $2, \
                                 refresh_token_hash = COALESCE($3, refresh_token_hash), \
                                 last_activity = NOW() \
             WHERE id = $1 AND is_active",
        )
        .bind(session_id)
        .bind(access_hash)
        .bind(refresh_hash)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update session tokens"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, user_id: Uuid, device_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = FALSE \
             WHERE user_id = $1 AND device_id = $2 AND is_active",
        )
        .bind(user_id)
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to deactivate session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_all(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("UPDATE sessions SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to deactivate sessions"))?;
        Ok(result.rows_affected())
    }

    async fn count_active(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count active sessions"))
    }
}
