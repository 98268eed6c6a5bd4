//! Attendance session and log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rollcall_core::error::{AppError, ErrorKind};
use rollcall_core::result::AppResult;
use rollcall_entity::attendance::{AttendanceLog, AttendanceSession, NewAttendanceLog};

use crate::store::{AttendanceStore, InsertOutcome};

/// PostgreSQL implementation of [`AttendanceStore`].
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for AttendanceRepository {
    async fn create_session(&self, session: AttendanceSession) -> AppResult<AttendanceSession> {
        sqlx::query_as::<_, AttendanceSession>(
            "INSERT INTO attendance_sessions (id, class_id, start_time, end_time, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(session.id)
        .bind(session.class_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.status)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create attendance session", e)
        })
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<AttendanceSession>> {
        sqlx::query_as::<_, AttendanceSession>("SELECT * FROM attendance_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find attendance session", e)
            })
    }

    async fn complete_session(
        &self,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceSession>> {
        sqlx::query_as::<_, AttendanceSession>(
            "UPDATE attendance_sessions SET status = 'completed', end_time = $2 \
             WHERE id = $1 AND status = 'ongoing' \
             RETURNING *",
        )
        .bind(id)
        .bind(end_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to complete attendance session", e)
        })
    }

    async fn find_log(
        &self,
        session_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<AttendanceLog>> {
        sqlx::query_as::<_, AttendanceLog>(
            "SELECT * FROM attendance_logs WHERE session_id = $1 AND student_id = $2",
        )
        .bind(session_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attendance log", e))
    }

    async fn insert_log(&self, log: NewAttendanceLog) -> AppResult<InsertOutcome> {
        let row = log.into_log();

        // The session guard and the unique key are evaluated by one statement.
        let inserted = sqlx::query_as::<_, AttendanceLog>(
            "INSERT INTO attendance_logs \
             (id, session_id, student_id, checked_in_at, method, confidence_score, is_anomaly, device_id, location) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9 \
             WHERE EXISTS (SELECT 1 FROM attendance_sessions WHERE id = $2 AND status = 'ongoing') \
             ON CONFLICT ON CONSTRAINT attendance_logs_session_student_key DO NOTHING \
             RETURNING *",
        )
        .bind(row.id)
        .bind(row.session_id)
        .bind(row.student_id)
        .bind(row.checked_in_at)
        .bind(row.method)
        .bind(row.confidence_score)
        .bind(row.is_anomaly)
        .bind(&row.device_id)
        .bind(&row.location)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert attendance log", e)
        })?;

        if let Some(log) = inserted {
            return Ok(InsertOutcome::Inserted(log));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM attendance_logs WHERE session_id = $1 AND student_id = $2)",
        )
        .bind(row.session_id)
        .bind(row.student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to classify rejected check-in", e)
        })?;

        Ok(if duplicate {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::SessionClosed
        })
    }

    async fn count_logs(&self, session_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance_logs WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count attendance logs", e)
            })
    }

    async fn list_logs(&self, session_id: Uuid) -> AppResult<Vec<AttendanceLog>> {
        sqlx::query_as::<_, AttendanceLog>(
            "SELECT * FROM attendance_logs WHERE session_id = $1 ORDER BY checked_in_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attendance logs", e))
    }

    async fn list_sessions_for_class(
        &self,
        class_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<AttendanceSession>> {
        sqlx::query_as::<_, AttendanceSession>(
            "SELECT * FROM attendance_sessions \
             WHERE class_id = $1 \
               AND ($2::timestamptz IS NULL OR start_time >= $2) \
               AND ($3::timestamptz IS NULL OR start_time <= $3) \
             ORDER BY start_time ASC",
        )
        .bind(class_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list class sessions", e)
        })
    }

    async fn list_logs_for_sessions(&self, session_ids: &[Uuid]) -> AppResult<Vec<AttendanceLog>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, AttendanceLog>(
            "SELECT * FROM attendance_logs WHERE session_id = ANY($1) ORDER BY checked_in_at ASC",
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list logs for sessions", e)
        })
    }
}
