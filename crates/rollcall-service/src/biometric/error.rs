//! Failure modes of the biometric verifier.

use thiserror::Error;

use rollcall_core::error::{AppError, ErrorKind};

/// Why a face verification produced no usable score.
///
/// None of these is a low confidence result; a score that was produced is
/// never reported as an error.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("biometric service rejected our credentials")]
    Unauthorized,

    #[error("no enrolled face for the student")]
    NotFound,

    #[error("biometric service rejected the sample: {0}")]
    BadRequest(String),

    #[error("biometric service did not answer in time")]
    Timeout,

    #[error("biometric service unreachable: {0}")]
    Unavailable(String),

    #[error("biometric service failed with status {0}")]
    Upstream(u16),

    #[error("malformed verification response: {0}")]
    InvalidResponse(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let kind = match err {
            GatewayError::Timeout => ErrorKind::GatewayTimeout,
            _ => ErrorKind::Gateway,
        };
        let message = match &err {
            GatewayError::Unauthorized => "Biometric service authentication failed".to_string(),
            GatewayError::NotFound => "No enrolled face found for student".to_string(),
            GatewayError::BadRequest(_) => "Biometric sample was rejected".to_string(),
            GatewayError::Timeout => "Biometric verification timed out".to_string(),
            GatewayError::Unavailable(_) => "Biometric service unavailable".to_string(),
            GatewayError::Upstream(status) => format!("Biometric service error ({status})"),
            GatewayError::InvalidResponse(_) => {
                "Biometric service returned an invalid response".to_string()
            }
        };
        AppError::with_source(kind, message, err)
    }
}
