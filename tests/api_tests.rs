// tests/api_tests.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use schedule_form::{
    FormSession, HttpBackend, ScheduleBackend,
    catalog::OptionCatalog,
    error::{AppError, GENERIC_FAILURE, NETWORK_FAILURE},
    models::{
        row::{FieldValue, FileHandle, RowKind, fields},
        survey::SurveyField,
    },
    script::{parse_script, replay},
    view::HeadlessView,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// One multipart part as received by the mock service.
#[derive(Debug, Clone)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct Captured {
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
    emails: Arc<Mutex<Vec<String>>>,
}

impl Captured {
    fn part(&self, name: &str) -> Option<ReceivedPart> {
        self.parts.lock().unwrap().iter().find(|p| p.name == name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.parts.lock().unwrap().iter().map(|p| p.name.clone()).collect()
    }
}

async fn read_parts(captured: &Captured, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        captured.parts.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            bytes,
        });
    }
}

async fn generate_ok(State(captured): State<Captured>, multipart: Multipart) -> impl IntoResponse {
    read_parts(&captured, multipart).await;
    Json(json!({
        "message": "Success",
        "ics_url": "/download/schedule.ics",
        "stats": {"scheduled": 2, "unscheduled": 0},
        "assignments": [
            {
                "id": "assign_0",
                "name": "Essay (History)",
                "class_name": "History",
                "due_date": "2024-05-01 23:59",
                "time_estimate": 3.0,
                "sessions_needed": 1,
                "assignment_type": "Research Paper",
                "is_fixed_event": false
            }
        ]
    }))
}

async fn generate_rejected(State(captured): State<Captured>, multipart: Multipart) -> impl IntoResponse {
    read_parts(&captured, multipart).await;
    (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid date"})))
}

async fn generate_garbage(State(captured): State<Captured>, multipart: Multipart) -> impl IntoResponse {
    read_parts(&captured, multipart).await;
    (StatusCode::OK, "<html>definitely not json</html>")
}

async fn user_preferences(
    State(captured): State<Captured>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let email = params.get("email").cloned().unwrap_or_default();
    captured.emails.lock().unwrap().push(email.clone());
    if email == "known@example.com" {
        (
            StatusCode::OK,
            Json(json!({"major": "Economics", "weekdayStart": "08:00"})),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({})))
    }
}

/// Helper function to spawn the mock scheduling service on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the capture handle.
async fn spawn_app() -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .route("/api/generate-schedule", post(generate_ok))
        .route("/rejecting/generate-schedule", post(generate_rejected))
        .route("/garbage/generate-schedule", post(generate_garbage))
        .route("/api/get-user-preferences", get(user_preferences))
        .layer(TraceLayer::new_for_http())
        .with_state(captured.clone());

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, captured)
}

fn backend(address: &str, submit_path: &str) -> HttpBackend {
    HttpBackend::with_client(
        reqwest::Client::new(),
        address,
        submit_path,
        "/api/get-user-preferences",
    )
    .expect("valid backend url")
}

fn new_session() -> FormSession<HeadlessView> {
    FormSession::new(
        Arc::new(OptionCatalog::standard()),
        HeadlessView::new(),
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn submit_sends_multipart_and_renders_results() {
    // Arrange
    let (address, captured) = spawn_app().await;
    let backend = backend(&address, "/api/generate-schedule");
    let mut session = new_session();
    let row = session.registry().id_at(RowKind::Assignment, 0).unwrap();
    session.edit_field(row, fields::ASSIGNMENT_NAME, FieldValue::text("Essay"));
    session.edit_field(row, fields::DUE_DATE, FieldValue::text("2024-05-01"));
    session.edit_field(row, fields::ASSIGNMENT_TYPE, FieldValue::text("Research Paper"));
    let syllabus = session.add_row(RowKind::SyllabusUpload);
    session.edit_field(
        syllabus,
        fields::SYLLABUS_FILE,
        FieldValue::File(FileHandle::new("hist101.pdf", b"%PDF-1.4 fake".to_vec())),
    );
    session.attach_calendar(FileHandle::new("classes.ics", b"BEGIN:VCALENDAR".to_vec()));
    session.edit_survey(SurveyField::Email, "student@example.com");

    // Act
    assert!(session.submit(&backend).await);

    // Assert: request shape
    assert_eq!(captured.names(), vec!["data", "pdf_count", "pdf_0", "ics"]);
    let data: serde_json::Value =
        serde_json::from_slice(&captured.part("data").unwrap().bytes).unwrap();
    assert_eq!(data["courses"][0]["assignment_name"], "Essay");
    assert_eq!(data["courses"][0]["assignment_type"], "Research Paper");
    assert_eq!(data["survey"]["email"], "student@example.com");
    assert_eq!(captured.part("pdf_count").unwrap().bytes, b"1".to_vec());
    let pdf = captured.part("pdf_0").unwrap();
    assert_eq!(pdf.file_name.as_deref(), Some("hist101.pdf"));
    assert_eq!(pdf.bytes, b"%PDF-1.4 fake".to_vec());
    assert_eq!(
        captured.part("ics").unwrap().file_name.as_deref(),
        Some("classes.ics")
    );

    // Assert: response rendering
    let view = session.view();
    assert_eq!(view.row(row).unwrap().estimate.as_deref(), Some("3"));
    let results = view.results.as_ref().unwrap();
    assert_eq!(
        results.download_url.as_deref(),
        Some(format!("{}/download/schedule.ics", address).as_str())
    );
    assert_eq!(results.scheduled, Some(2));
    let html = view.results_html.as_deref().unwrap();
    assert!(html.contains("/download/schedule.ics"));
    assert!(html.contains("History"));
    assert!(!view.submit_enabled);
}

#[tokio::test]
async fn rejected_submission_shows_server_error() {
    // Arrange
    let (address, _captured) = spawn_app().await;
    let backend = backend(&address, "/rejecting/generate-schedule");
    let mut session = new_session();

    // Act
    session.submit(&backend).await;

    // Assert
    assert!(session.view().last_notification().unwrap().contains("Invalid date"));
    assert!(session.view().submit_enabled);
}

#[tokio::test]
async fn malformed_success_body_is_a_failure() {
    let (address, _captured) = spawn_app().await;
    let backend = backend(&address, "/garbage/generate-schedule");
    let mut session = new_session();

    session.submit(&backend).await;

    assert_eq!(session.view().last_notification(), Some(GENERIC_FAILURE));
    assert!(session.view().submit_enabled);
    assert!(session.view().results.is_none());
}

#[tokio::test]
async fn unreachable_service_shows_generic_network_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let backend = backend(&format!("http://127.0.0.1:{}", port), "/api/generate-schedule");
    let mut session = new_session();

    session.submit(&backend).await;

    assert_eq!(session.view().last_notification(), Some(NETWORK_FAILURE));
    assert!(session.view().submit_enabled);
}

#[tokio::test]
async fn preferences_lookup_returns_saved_values_or_none() {
    let (address, captured) = spawn_app().await;
    let backend = backend(&address, "/api/generate-schedule");

    let known = backend.fetch_preferences("known@example.com").await.unwrap();
    let unknown = backend.fetch_preferences("nobody@example.com").await.unwrap();

    assert_eq!(known.unwrap().major.as_deref(), Some("Economics"));
    assert!(unknown.is_none());
    assert_eq!(
        *captured.emails.lock().unwrap(),
        vec!["known@example.com".to_string(), "nobody@example.com".to_string()]
    );
}

#[tokio::test]
async fn email_commit_autofills_from_service() {
    let (address, _captured) = spawn_app().await;
    let backend = backend(&address, "/api/generate-schedule");
    let mut session = new_session();
    session.edit_survey(SurveyField::Email, "known@example.com");

    session
        .dispatch(schedule_form::FormEvent::EmailCommitted, &backend)
        .await;

    assert_eq!(session.survey().major, "Economics");
    assert_eq!(session.preferences().weekday_start, "08:00");
}

#[tokio::test]
async fn scripted_session_replays_against_service() {
    let (address, captured) = spawn_app().await;
    let backend = backend(&address, "/api/generate-schedule");
    let mut session = FormSession::new(
        Arc::new(OptionCatalog::standard()),
        HeadlessView::new(),
        Duration::from_millis(0),
    );
    let steps = parse_script(
        r#"[
            {"action": "edit_field", "kind": "assignment", "position": 0, "field": "assignment_name", "value": "Essay"},
            {"action": "edit_field", "kind": "assignment", "position": 0, "field": "due_date", "value": "2024-05-01"},
            {"action": "edit_field", "kind": "assignment", "position": 0, "field": "work_sessions", "value": 2},
            {"action": "add_row", "kind": "assignment"},
            {"action": "remove_row", "kind": "assignment", "position": 1},
            {"action": "edit_survey", "field": "major", "value": "History"},
            {"action": "drag", "token": "night", "pointer_ys": [0.0]},
            {"action": "submit"}
        ]"#,
    )
    .unwrap();

    replay(&mut session, &steps, &backend).await.unwrap();

    let data: serde_json::Value =
        serde_json::from_slice(&captured.part("data").unwrap().bytes).unwrap();
    assert_eq!(data["courses"].as_array().unwrap().len(), 1);
    assert_eq!(data["courses"][0]["work_sessions"], 2);
    assert_eq!(data["survey"]["major"], "History");
    assert_eq!(data["preferences"]["timeRanking"][0]["token"], "night");
    // Zero delay: the replay has already applied the re-enable.
    assert!(session.view().submit_enabled);
}

#[tokio::test]
async fn script_addressing_a_missing_row_fails() {
    let (address, _captured) = spawn_app().await;
    let backend = backend(&address, "/api/generate-schedule");
    let mut session = new_session();
    let steps =
        parse_script(r#"[{"action": "remove_row", "kind": "syllabus_upload", "position": 0}]"#)
            .unwrap();

    let result = replay(&mut session, &steps, &backend).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
