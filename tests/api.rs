//! HTTP boundary tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use doc2deck::server::{create_router, AppState, ErrorBody, JobResponse};
use doc2deck::{JobState, Orchestrator, ServiceConfig, StorageKind};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "doc2deck-test-boundary";

fn create_test_app(tmp: &TempDir) -> (Router, Orchestrator) {
    let orchestrator = Orchestrator::new(
        ServiceConfig::builder()
            .storage_root(tmp.path().join("store"))
            .max_upload_bytes(64 * 1024)
            .build()
            .unwrap(),
    );
    (
        create_router(AppState::new(orchestrator.clone())),
        orchestrator,
    )
}

/// Multipart text fields, without the closing boundary.
fn fields_part(fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body
}

/// A complete multipart form with text fields and no document.
fn form_without_document(fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = fields_part(fields);
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// A complete multipart form with a `document` part.
fn form(filename: &str, mime: &str, bytes: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = fields_part(fields);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn default_fields() -> Vec<(&'static str, &'static str)> {
    vec![("audience", "general"), ("length", "medium"), ("summary", "true")]
}

fn convert_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn input_files(orch: &Orchestrator) -> usize {
    std::fs::read_dir(orch.storage().dir(StorageKind::Input))
        .map(|d| d.count())
        .unwrap_or(0)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn given_running_server_when_health_check_then_returns_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = create_test_app(&tmp);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "ok");
}

#[tokio::test]
async fn given_text_upload_when_convert_with_wait_then_deck_downloads() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let body = form("hello.txt", "text/plain", b"Hello world", &default_fields());

    let response = app
        .clone()
        .oneshot(convert_request("/api/convert?wait=true", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let job: JobResponse = serde_json::from_value(json(response).await).unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.progress, 100);
    let url = job.download_url.expect("completed job has a download url");

    let response = app.oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"hello.pptx\"");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(input_files(&orch), 0);
}

#[tokio::test]
async fn given_text_upload_when_convert_without_wait_then_accepted_and_pollable() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let body = form("a.txt", "text/plain", b"Poll me", &default_fields());

    let response = app
        .clone()
        .oneshot(convert_request("/api/convert", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = json(response).await;
    let job_id = accepted["job_id"].as_str().unwrap().to_string();

    orch.wait(job_id.parse().unwrap()).await.unwrap();
    let response = app
        .oneshot(get(&format!("/api/jobs/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = json(response).await;
    assert_eq!(status["state"], "completed");
    assert_eq!(status["filename"], "a.txt");
}

#[tokio::test]
async fn given_zip_upload_when_convert_then_validation_error_and_nothing_stored() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let body = form(
        "archive.zip",
        "application/zip",
        b"PK\x03\x04",
        &default_fields(),
    );

    let response = app
        .oneshot(convert_request("/api/convert", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_value(json(response).await).unwrap();
    assert_eq!(error.kind, "ValidationError");
    assert_eq!(input_files(&orch), 0);
    assert_eq!(orch.job_count().await, 0);
}

#[tokio::test]
async fn given_missing_document_when_convert_then_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = create_test_app(&tmp);

    let response = app
        .oneshot(convert_request(
            "/api/convert",
            form_without_document(&default_fields()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn given_missing_audience_when_convert_with_wait_then_validation_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = create_test_app(&tmp);
    let body = form("a.txt", "text/plain", b"text", &[("length", "short")]);

    let response = app
        .oneshot(convert_request("/api/convert?wait=true", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json(response).await;
    assert_eq!(error["kind"], "ValidationError");
    assert_eq!(error["error"], "Missing audience level");
    assert!(error["job_id"].is_string());
}

#[tokio::test]
async fn given_corrupt_pdf_when_convert_with_wait_then_extraction_error_without_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let body = form(
        "bad.pdf",
        "application/pdf",
        b"%PDF-1.4\n1 0 obj\n<<",
        &default_fields(),
    );

    let response = app
        .oneshot(convert_request("/api/convert?wait=true", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json(response).await;
    assert_eq!(error["kind"], "ExtractionError");
    let store = tmp.path().join("store").display().to_string();
    assert!(!error["error"].as_str().unwrap().contains(&store));
    assert_eq!(input_files(&orch), 0);
}

#[tokio::test]
async fn given_oversized_upload_when_convert_then_validation_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let big = vec![b'a'; 70 * 1024];
    let body = form("big.txt", "text/plain", &big, &default_fields());

    let response = app
        .oneshot(convert_request("/api/convert", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["kind"], "ValidationError");
    assert_eq!(input_files(&orch), 0);
}

#[tokio::test]
async fn given_unknown_or_malformed_id_when_queried_then_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = create_test_app(&tmp);

    let unknown = uuid::Uuid::new_v4();
    for uri in [
        format!("/api/jobs/{unknown}"),
        format!("/api/jobs/{unknown}/download"),
        "/api/jobs/not-a-uuid".to_string(),
    ] {
        let response = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json(response).await["kind"], "NotFound");
    }
}

#[tokio::test]
async fn given_unstarted_job_when_download_then_conflict() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, orch) = create_test_app(&tmp);
    let id = orch
        .intake(doc2deck::Upload::new("a.txt", None, b"x".to_vec()))
        .await
        .unwrap();

    let response = app
        .oneshot(get(&format!("/api/jobs/{id}/download")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json(response).await["kind"], "NotReady");
}

#[tokio::test]
async fn given_completed_job_when_deleted_then_gone() {
    let tmp = tempfile::tempdir().unwrap();
    let (app, _) = create_test_app(&tmp);
    let body = form("a.txt", "text/plain", b"Bye", &default_fields());

    let response = app
        .clone()
        .oneshot(convert_request("/api/convert?wait=true", body))
        .await
        .unwrap();
    let job_id = json(response).await["job_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/jobs/{job_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/api/jobs/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
