//! Class entity, read through the class directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A course taught by one lecturer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    /// Recipient of session, anomaly, and low-attendance notifications.
    pub lecturer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn new(name: impl Into<String>, lecturer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            lecturer_id,
            created_at: Utc::now(),
        }
    }
}
