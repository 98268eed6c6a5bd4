//! HTTP client for the face verification service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use rollcall_core::config::BiometricConfig;
use rollcall_core::error::{AppError, ErrorKind};

use super::error::GatewayError;
use super::gateway::{BiometricGateway, FaceMatch};

const VERIFY_PATH: &str = "/api/v1/face/verify";

#[derive(Serialize)]
struct VerifyRequest<'a> {
    face_data: &'a str,
    user_id: String,
}

/// [`BiometricGateway`] over `POST {base_url}/api/v1/face/verify`.
#[derive(Debug, Clone)]
pub struct HttpBiometricGateway {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpBiometricGateway {
    pub fn new(config: &BiometricConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build biometric HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl BiometricGateway for HttpBiometricGateway {
    async fn verify_face(&self, sample: &str, student_id: Uuid) -> Result<FaceMatch, GatewayError> {
        let url = format!("{}{}", self.base_url, VERIFY_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&VerifyRequest {
                face_data: sample,
                user_id: student_id.to_string(),
            })
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!(student_id = %student_id, status = status.as_u16(), "Biometric verifier answered");

        match status {
            s if s.is_success() => response.json::<FaceMatch>().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::InvalidResponse(e.to_string())
                }
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let detail = response.text().await.unwrap_or_default();
                Err(GatewayError::BadRequest(detail))
            }
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => Err(GatewayError::Timeout),
            other => Err(GatewayError::Upstream(other.as_u16())),
        }
    }
}

fn classify_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Unavailable(err.to_string())
    }
}
