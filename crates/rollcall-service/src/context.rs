//! Request context carrying the authenticated user and device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rollcall_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the API layer after token and session validation, then passed
/// into handlers so every operation knows who is acting and from which device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Device id of the validated session.
    pub device_id: String,
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user: &User, device_id: impl Into<String>) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            device_id: device_id.into(),
            request_time: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    pub fn is_lecturer(&self) -> bool {
        matches!(self.role, UserRole::Lecturer)
    }

    pub fn is_student(&self) -> bool {
        matches!(self.role, UserRole::Student)
    }
}
