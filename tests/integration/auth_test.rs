//! Integration tests for the authentication flow.

use axum::http::StatusCode;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": app.students[0].email,
                "password": PASSWORD,
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let data = &response.body["data"];
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());
    assert!(!data["deviceId"].as_str().unwrap().is_empty());
    assert_eq!(data["user"]["role"], "student");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": app.students[0].email,
                "password": "wrongpassword",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_unknown_email_looks_like_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": "nobody@uni.test",
                "password": PASSWORD,
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_malformed_email() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": PASSWORD })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_protected_route_needs_token_and_device() {
    let app = TestApp::new().await;
    let creds = app.login(&app.students[0]).await;
    let bearer = format!("Bearer {}", creds.access_token);

    let no_device = app
        .request("POST", "/api/v1/auth/signout", None, &[("Authorization", bearer.as_str())])
        .await;
    assert_eq!(no_device.status, StatusCode::UNAUTHORIZED);

    let no_token = app
        .request(
            "POST",
            "/api/v1/auth/signout",
            None,
            &[("X-Device-Id", creds.device_id.as_str())],
        )
        .await;
    assert_eq!(no_token.status, StatusCode::UNAUTHORIZED);

    let wrong_device = app
        .request(
            "POST",
            "/api/v1/auth/signout",
            None,
            &[("Authorization", bearer.as_str()), ("X-Device-Id", "some-other-device")],
        )
        .await;
    assert_eq!(wrong_device.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_login_revokes_previous_device() {
    let app = TestApp::new().await;
    let first = app.login(&app.lecturer).await;
    let second = app.login(&app.lecturer).await;
    assert_ne!(first.device_id, second.device_id);

    let stale = app
        .authed("GET", &format!("/api/v1/reports/classes/{}", app.class.id), None, &first)
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app
        .authed("GET", &format!("/api/v1/reports/classes/{}", app.class.id), None, &second)
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_issues_access_token() {
    let app = TestApp::new().await;
    let creds = app.login(&app.lecturer).await;

    let response = app
        .request(
            "GET",
            "/api/v1/auth/refresh-token",
            None,
            &[
                ("X-Refresh-Token", creds.refresh_token.as_str()),
                ("X-Device-Id", creds.device_id.as_str()),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    let access = data["accessToken"].as_str().unwrap().to_string();
    assert_ne!(access, creds.access_token);
    // Fresh refresh tokens are not rotated.
    assert!(data.get("refreshToken").is_none());

    let renewed = crate::helpers::Credentials {
        access_token: access,
        ..creds
    };
    let report = app
        .authed("GET", &format!("/api/v1/reports/classes/{}", app.class.id), None, &renewed)
        .await;
    assert_eq!(report.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_rejections() {
    let app = TestApp::new().await;
    let creds = app.login(&app.lecturer).await;

    let missing_device = app
        .request(
            "GET",
            "/api/v1/auth/refresh-token",
            None,
            &[("X-Refresh-Token", creds.refresh_token.as_str())],
        )
        .await;
    assert_eq!(missing_device.status, StatusCode::UNAUTHORIZED);

    // An access token is not a refresh token.
    let wrong_kind = app
        .request(
            "GET",
            "/api/v1/auth/refresh-token",
            None,
            &[
                ("X-Refresh-Token", creds.access_token.as_str()),
                ("X-Device-Id", creds.device_id.as_str()),
            ],
        )
        .await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);

    let wrong_device = app
        .request(
            "GET",
            "/api/v1/auth/refresh-token",
            None,
            &[
                ("X-Refresh-Token", creds.refresh_token.as_str()),
                ("X-Device-Id", "unknown-device"),
            ],
        )
        .await;
    assert_eq!(wrong_device.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signout_invalidates_session() {
    let app = TestApp::new().await;
    let creds = app.login(&app.students[1]).await;

    let response = app.authed("POST", "/api/v1/auth/signout", None, &creds).await;
    assert_eq!(response.status, StatusCode::OK);

    let again = app.authed("POST", "/api/v1/auth/signout", None, &creds).await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);

    let refresh = app
        .request(
            "GET",
            "/api/v1/auth/refresh-token",
            None,
            &[
                ("X-Refresh-Token", creds.refresh_token.as_str()),
                ("X-Device-Id", creds.device_id.as_str()),
            ],
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signout_all() {
    let app = TestApp::new().await;
    let creds = app.login(&app.admin).await;

    let response = app.authed("POST", "/api/v1/auth/signout-all", None, &creds).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["sessionsClosed"], 1);

    let after = app.authed("POST", "/api/v1/auth/signout-all", None, &creds).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/v1/health", None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["store"], "connected");
}
