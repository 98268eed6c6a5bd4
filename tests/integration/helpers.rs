//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;
use uuid::Uuid;

use rollcall_auth::CredentialHasher;
use rollcall_core::config::AppConfig;
use rollcall_database::{MemoryStore, Stores};
use rollcall_entity::class::Class;
use rollcall_entity::notification::Notification;
use rollcall_entity::user::{User, UserRole};
use rollcall_service::{
    BiometricGateway, ChannelNotifier, FaceMatch, GatewayError, NotificationFanOut,
};

pub const PASSWORD: &str = "password123";
pub const SERVICE_KEY: &str = "svc-test-key";
/// Any valid base64 works; the fake verifier ignores the sample.
pub const FACE_SAMPLE: &str = "data:image/jpeg;base64,aGVsbG8gd29ybGQ=";

const TEST_CONFIG: &str = r#"
    [database]
    url = "memory://"

    [auth]
    access_token_secret = "integration-access-secret"
    refresh_token_secret = "integration-refresh-secret"

    [biometric]
    base_url = "http://verifier.invalid"
    timeout_ms = 500

    [attendance]
    service_api_key = "svc-test-key"
"#;

/// What the fake face verifier answers.
#[derive(Debug, Clone, Copy)]
pub enum Verdict {
    Score(f64),
    Unavailable,
}

struct FakeGateway(Verdict);

#[async_trait]
impl BiometricGateway for FakeGateway {
    async fn verify_face(&self, _: &str, _: Uuid) -> Result<FaceMatch, GatewayError> {
        match self.0 {
            Verdict::Score(confidence) => Ok(FaceMatch {
                matched: confidence >= 0.5,
                confidence,
                face_id: None,
            }),
            Verdict::Unavailable => Err(GatewayError::Unavailable("connection refused".into())),
        }
    }
}

/// Credentials a client replays after login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub device_id: String,
}

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub admin: User,
    pub lecturer: User,
    pub students: Vec<User>,
    pub class: Class,
    notifications: UnboundedReceiver<Notification>,
}

impl TestApp {
    /// Three students, one class, and a verifier scoring 0.95.
    pub async fn new() -> Self {
        Self::with_verdict(Verdict::Score(0.95)).await
    }

    pub async fn with_verdict(verdict: Verdict) -> Self {
        let config = AppConfig::from_toml(TEST_CONFIG).expect("Failed to parse test config");
        let store = MemoryStore::new();

        let hash = CredentialHasher::new()
            .hash(PASSWORD)
            .expect("Failed to hash password");
        let admin = store
            .insert_user(User::new("admin@uni.test", &hash, "Ada Admin", UserRole::Admin))
            .await
            .expect("Failed to seed admin");
        let lecturer = store
            .insert_user(User::new("lee@uni.test", &hash, "Lee Lecturer", UserRole::Lecturer))
            .await
            .expect("Failed to seed lecturer");
        let mut students = Vec::new();
        for i in 0..3 {
            let student = store
                .insert_user(User::new(
                    format!("student{i}@uni.test"),
                    &hash,
                    format!("Student {i}"),
                    UserRole::Student,
                ))
                .await
                .expect("Failed to seed student");
            students.push(student);
        }
        let class = store
            .insert_class(Class::new("Operating Systems", lecturer.id))
            .await
            .expect("Failed to seed class");

        let (channel, notifications) = ChannelNotifier::new();
        let fanout = NotificationFanOut::default().with(Arc::new(channel));

        let state = rollcall_api::build_state(
            config,
            Stores::memory(store),
            Arc::new(FakeGateway(verdict)),
            fanout,
        )
        .expect("Failed to build state");

        Self {
            router: rollcall_api::build_app(state),
            admin,
            lecturer,
            students,
            class,
            notifications,
        }
    }

    /// Make a request with explicit headers.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Make a request as a logged-in client.
    pub async fn authed(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        creds: &Credentials,
    ) -> TestResponse {
        let bearer = format!("Bearer {}", creds.access_token);
        self.request(
            method,
            path,
            body,
            &[
                ("Authorization", bearer.as_str()),
                ("X-Device-Id", creds.device_id.as_str()),
            ],
        )
        .await
    }

    pub async fn login(&self, user: &User) -> Credentials {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(serde_json::json!({ "email": user.email, "password": PASSWORD })),
                &[],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        let data = &response.body["data"];
        Credentials {
            access_token: data["accessToken"].as_str().expect("accessToken").to_string(),
            refresh_token: data["refreshToken"].as_str().expect("refreshToken").to_string(),
            device_id: data["deviceId"].as_str().expect("deviceId").to_string(),
        }
    }

    /// Open a session for the seeded class as the lecturer.
    pub async fn start_session(&self, lecturer: &Credentials) -> Uuid {
        let response = self
            .authed(
                "POST",
                "/api/v1/attendance/sessions/start",
                Some(serde_json::json!({ "classId": self.class.id })),
                lecturer,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "start failed: {}", response.body);
        response.body["data"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("session id")
    }

    /// Everything the fan-out delivers until it goes quiet.
    pub async fn notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(Some(n)) =
            tokio::time::timeout(Duration::from_millis(150), self.notifications.recv()).await
        {
            out.push(n);
        }
        out
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
