//! The biometric verification seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GatewayError;

/// Verdict of a face verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Whether the verifier considered the sample a match.
    #[serde(rename = "match")]
    pub matched: bool,
    /// Advisory score in `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub face_id: Option<String>,
}

/// Scores a face sample against a student's enrolled face.
///
/// The result is advisory and untrusted; callers bound each call with a
/// timeout and range-check the score.
#[async_trait]
pub trait BiometricGateway: Send + Sync {
    /// `sample` is the base64-encoded image as received from the client.
    async fn verify_face(&self, sample: &str, student_id: Uuid) -> Result<FaceMatch, GatewayError>;
}
