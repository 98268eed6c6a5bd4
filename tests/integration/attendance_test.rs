//! Integration tests for attendance sessions, check-ins, and reports.

use axum::http::StatusCode;
use uuid::Uuid;

use rollcall_entity::notification::NotificationKind;

use crate::helpers::{FACE_SAMPLE, SERVICE_KEY, TestApp, Verdict};

fn check_in_body(session_id: Uuid, student_id: Uuid, method: &str) -> serde_json::Value {
    serde_json::json!({
        "sessionId": session_id,
        "studentId": student_id,
        "method": method,
        "biometricData": FACE_SAMPLE,
        "deviceId": "phone-1",
        "location": "Room 101",
    })
}

#[tokio::test]
async fn test_only_lecturers_start_sessions() {
    let app = TestApp::new().await;
    let student = app.login(&app.students[0]).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/sessions/start",
            Some(serde_json::json!({ "classId": app.class.id })),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_start_session_for_unknown_class() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/sessions/start",
            Some(serde_json::json!({ "classId": Uuid::new_v4() })),
            &lecturer,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let mut app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;

    let path = format!("/api/v1/attendance/sessions/{session_id}/end");
    let ended = app.authed("PUT", &path, None, &lecturer).await;
    assert_eq!(ended.status, StatusCode::OK);
    assert_eq!(ended.body["data"]["status"], "completed");
    assert!(ended.body["data"]["endTime"].is_string());

    let again = app.authed("PUT", &path, None, &lecturer).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let unknown = app
        .authed(
            "PUT",
            &format!("/api/v1/attendance/sessions/{}/end", Uuid::new_v4()),
            None,
            &lecturer,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let malformed = app
        .authed("PUT", "/api/v1/attendance/sessions/not-a-uuid/end", None, &lecturer)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let kinds: Vec<_> = app.notifications().await.into_iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::SessionStarted));
    assert!(kinds.contains(&NotificationKind::SessionEnded));
}

#[tokio::test]
async fn test_nfc_check_in_then_duplicate() {
    let mut app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    app.notifications().await;

    let student = app.login(&app.students[0]).await;
    let body = check_in_body(session_id, app.students[0].id, "nfc");

    let first = app
        .authed("POST", "/api/v1/attendance/check-in", Some(body.clone()), &student)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["confidenceScore"], 1.0);
    assert_eq!(first.body["data"]["isAnomaly"], false);

    let second = app
        .authed("POST", "/api/v1/attendance/check-in", Some(body), &student)
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let sent = app.notifications().await;
    let confirmed: Vec<_> = sent
        .iter()
        .filter(|n| n.kind == NotificationKind::CheckInConfirmed)
        .collect();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].recipient_id, app.students[0].id);
    // One of three students present: 33% is below the alert threshold.
    assert!(sent
        .iter()
        .any(|n| n.kind == NotificationKind::LowAttendance && n.recipient_id == app.lecturer.id));
}

#[tokio::test]
async fn test_students_check_in_only_themselves() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let student = app.login(&app.students[0]).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.students[1].id, "ble")),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let as_lecturer = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.lecturer.id, "ble")),
            &lecturer,
        )
        .await;
    assert_eq!(as_lecturer.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_face_check_in_low_confidence_is_flagged() {
    let mut app = TestApp::with_verdict(Verdict::Score(0.6)).await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let student = app.login(&app.students[2]).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.students[2].id, "face")),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["confidenceScore"], 0.6);
    assert_eq!(response.body["data"]["isAnomaly"], true);

    let anomalies: Vec<_> = app
        .notifications()
        .await
        .into_iter()
        .filter(|n| n.kind == NotificationKind::AnomalyDetected)
        .collect();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].recipient_id, app.lecturer.id);
}

#[tokio::test]
async fn test_face_check_in_requires_sample() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let student = app.login(&app.students[0]).await;

    let mut body = check_in_body(session_id, app.students[0].id, "face");
    body["biometricData"] = serde_json::Value::Null;

    let response = app
        .authed("POST", "/api/v1/attendance/check-in", Some(body), &student)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_method_rejected() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let student = app.login(&app.students[0]).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.students[0].id, "qr")),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verifier_outage_is_bad_gateway() {
    let app = TestApp::with_verdict(Verdict::Unavailable).await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let student = app.login(&app.students[0]).await;

    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.students[0].id, "face")),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.error_code(), "BIOMETRIC_GATEWAY_ERROR");

    // Nothing was recorded, so a retry after recovery is not a duplicate.
    let view = app
        .authed(
            "GET",
            &format!("/api/v1/attendance/sessions/{session_id}"),
            None,
            &lecturer,
        )
        .await;
    assert_eq!(view.body["data"]["logs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_check_in_after_session_ended() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    app.authed(
        "PUT",
        &format!("/api/v1/attendance/sessions/{session_id}/end"),
        None,
        &lecturer,
    )
    .await;

    let student = app.login(&app.students[0]).await;
    let response = app
        .authed(
            "POST",
            "/api/v1/attendance/check-in",
            Some(check_in_body(session_id, app.students[0].id, "geofence")),
            &student,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auto_check_in_requires_service_key() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let body = serde_json::json!({
        "studentId": app.students[0].id,
        "sessionId": session_id,
        "location": "Camera 3",
        "confidence": 0.91,
    });

    let missing = app
        .request("POST", "/api/v1/attendance/auto-checkin", Some(body.clone()), &[])
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let wrong = app
        .request(
            "POST",
            "/api/v1/attendance/auto-checkin",
            Some(body.clone()),
            &[("X-Service-Key", "guess")],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let ok = app
        .request(
            "POST",
            "/api/v1/attendance/auto-checkin",
            Some(body),
            &[("X-Service-Key", SERVICE_KEY)],
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["data"]["method"], "face");
    assert_eq!(ok.body["data"]["location"], "Camera 3");
    assert_eq!(ok.body["data"]["isAnomaly"], false);
}

#[tokio::test]
async fn test_auto_check_in_validation() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;
    let key = [("X-Service-Key", SERVICE_KEY)];

    let out_of_range = app
        .request(
            "POST",
            "/api/v1/attendance/auto-checkin",
            Some(serde_json::json!({
                "studentId": app.students[0].id,
                "sessionId": session_id,
                "location": "Camera 3",
                "confidence": 1.5,
            })),
            &key,
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let empty_location = app
        .request(
            "POST",
            "/api/v1/attendance/auto-checkin",
            Some(serde_json::json!({
                "studentId": app.students[0].id,
                "sessionId": session_id,
                "location": "",
                "confidence": 0.9,
            })),
            &key,
        )
        .await;
    assert_eq!(empty_location.status, StatusCode::BAD_REQUEST);

    let unknown_student = app
        .request(
            "POST",
            "/api/v1/attendance/auto-checkin",
            Some(serde_json::json!({
                "studentId": Uuid::new_v4(),
                "sessionId": session_id,
                "location": "Camera 3",
                "confidence": 0.9,
            })),
            &key,
        )
        .await;
    assert_eq!(unknown_student.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_attendance_view() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;

    for student in &app.students[..2] {
        let creds = app.login(student).await;
        let response = app
            .authed(
                "POST",
                "/api/v1/attendance/check-in",
                Some(check_in_body(session_id, student.id, "ble")),
                &creds,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let path = format!("/api/v1/attendance/sessions/{session_id}");
    let view = app.authed("GET", &path, None, &lecturer).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["data"]["session"]["status"], "ongoing");
    assert_eq!(view.body["data"]["logs"].as_array().unwrap().len(), 2);

    let admin = app.login(&app.admin).await;
    assert_eq!(app.authed("GET", &path, None, &admin).await.status, StatusCode::OK);

    let student = app.login(&app.students[2]).await;
    assert_eq!(
        app.authed("GET", &path, None, &student).await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_reports() {
    let app = TestApp::with_verdict(Verdict::Score(0.7)).await;
    let lecturer = app.login(&app.lecturer).await;
    let session_id = app.start_session(&lecturer).await;

    let first = app.login(&app.students[0]).await;
    app.authed(
        "POST",
        "/api/v1/attendance/check-in",
        Some(check_in_body(session_id, app.students[0].id, "face")),
        &first,
    )
    .await;
    let second = app.login(&app.students[1]).await;
    app.authed(
        "POST",
        "/api/v1/attendance/check-in",
        Some(check_in_body(session_id, app.students[1].id, "nfc")),
        &second,
    )
    .await;

    let class = app
        .authed(
            "GET",
            &format!("/api/v1/reports/classes/{}", app.class.id),
            None,
            &lecturer,
        )
        .await;
    assert_eq!(class.status, StatusCode::OK);
    let data = &class.body["data"];
    assert_eq!(data["totalSessions"], 1);
    assert_eq!(data["totalStudents"], 3);
    assert_eq!(data["attendanceByMethod"]["face"], 1);
    assert_eq!(data["attendanceByMethod"]["nfc"], 1);
    assert_eq!(data["anomalies"], 1);

    let own = app
        .authed(
            "GET",
            &format!(
                "/api/v1/reports/classes/{}/students/{}",
                app.class.id, app.students[0].id
            ),
            None,
            &first,
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["data"]["attendedSessions"], 1);
    assert_eq!(own.body["data"]["anomalies"], 1);

    let someone_else = app
        .authed(
            "GET",
            &format!(
                "/api/v1/reports/classes/{}/students/{}",
                app.class.id, app.students[1].id
            ),
            None,
            &first,
        )
        .await;
    assert_eq!(someone_else.status, StatusCode::FORBIDDEN);

    let class_as_student = app
        .authed(
            "GET",
            &format!("/api/v1/reports/classes/{}", app.class.id),
            None,
            &first,
        )
        .await;
    assert_eq!(class_as_student.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_report_range_must_be_ordered() {
    let app = TestApp::new().await;
    let lecturer = app.login(&app.lecturer).await;

    let response = app
        .authed(
            "GET",
            &format!(
                "/api/v1/reports/classes/{}?from=2026-03-02T00:00:00Z&to=2026-03-01T00:00:00Z",
                app.class.id
            ),
            None,
            &lecturer,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
