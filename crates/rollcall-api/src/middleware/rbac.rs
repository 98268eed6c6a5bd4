//! Role guards for handlers.

use uuid::Uuid;

use rollcall_core::error::AppError;
use rollcall_entity::user::UserRole;

use crate::extractors::AuthUser;

pub fn require_lecturer(auth: &AuthUser) -> Result<(), AppError> {
    if auth.role != UserRole::Lecturer {
        return Err(AppError::authorization("Lecturer access required"));
    }
    Ok(())
}

pub fn require_student(auth: &AuthUser) -> Result<(), AppError> {
    if auth.role != UserRole::Student {
        return Err(AppError::authorization("Student access required"));
    }
    Ok(())
}

pub fn require_lecturer_or_admin(auth: &AuthUser) -> Result<(), AppError> {
    match auth.role {
        UserRole::Lecturer | UserRole::Admin => Ok(()),
        UserRole::Student => Err(AppError::authorization(
            "Lecturer or Admin access required",
        )),
    }
}

/// Staff may read anyone's records; a student only their own.
pub fn require_self_or_staff(auth: &AuthUser, student_id: Uuid) -> Result<(), AppError> {
    if auth.user_id == student_id {
        return Ok(());
    }
    require_lecturer_or_admin(auth)
}
