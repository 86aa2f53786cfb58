//! Integration tests: upload → poll lifecycle, failures, unknown ids, concurrency.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use scan_api::server::{self, AppState};
use scan_llm::{MockCompletionClient, PromptTemplate};
use scan_scheduler::{
    InMemoryArtifactStore, InMemoryJobStore, InMemoryScheduler, JobStore, WorkerConfig,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const BOUNDARY: &str = "scanner-test-boundary";

struct TestApp {
    router: axum::Router,
    store: InMemoryJobStore,
    artifacts: InMemoryArtifactStore,
}

fn test_app_with(llm: MockCompletionClient, artifacts: InMemoryArtifactStore) -> TestApp {
    let store = InMemoryJobStore::new();
    let scheduler = InMemoryScheduler::new(
        Arc::new(store.clone()),
        Arc::new(artifacts.clone()),
        Arc::new(llm),
        PromptTemplate::service(),
        WorkerConfig {
            deadline: Duration::from_secs(5),
        },
    );
    let state = Arc::new(AppState::new(Arc::new(scheduler)));
    TestApp {
        router: server::router(state),
        store,
        artifacts,
    }
}

fn test_app_limited(max_upload_bytes: usize) -> TestApp {
    let store = InMemoryJobStore::new();
    let artifacts = InMemoryArtifactStore::new();
    let scheduler = InMemoryScheduler::new(
        Arc::new(store.clone()),
        Arc::new(artifacts.clone()),
        Arc::new(MockCompletionClient::replying("x")),
        PromptTemplate::service(),
        WorkerConfig::default(),
    );
    let state = Arc::new(
        AppState::new(Arc::new(scheduler)).with_max_upload_bytes(max_upload_bytes),
    );
    TestApp {
        router: server::router(state),
        store,
        artifacts,
    }
}

fn test_app(llm: MockCompletionClient) -> TestApp {
    test_app_with(llm, InMemoryArtifactStore::new())
}

fn multipart_body(field: &str, filename: &str, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        filename = filename,
        content = content
    )
}

fn upload_request(field: &str, filename: &str, content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    let j: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, j)
}

async fn upload(app: &axum::Router, filename: &str, content: &str) -> String {
    let (status, j) = send(app, upload_request("file", filename, content)).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", j);
    j["id"].as_str().unwrap().to_string()
}

async fn results(app: &axum::Router, id: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(format!("/results/{}", id))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn poll_terminal(app: &axum::Router, id: &str) -> Value {
    for _ in 0..300 {
        let (status, j) = results(app, id).await;
        assert_eq!(status, StatusCode::OK);
        if j["status"] != "processing" {
            return j;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {} still processing", id);
}

async fn wait_artifacts_removed(artifacts: &InMemoryArtifactStore) {
    for _ in 0..300 {
        if artifacts.is_empty().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("uploads were not removed");
}

#[tokio::test]
async fn upload_poll_processing_then_completed() {
    let app = test_app(
        MockCompletionClient::replying("<table>...</table>")
            .with_delay(Duration::from_millis(200)),
    );
    let id = upload(&app.router, "a.py", "import pickle").await;

    let (status, j) = results(&app.router, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j, json!({ "id": id, "status": "processing", "data": null }));

    let done = poll_terminal(&app.router, &id).await;
    assert_eq!(
        done,
        json!({ "id": id, "status": "completed", "data": "<table>...</table>" })
    );
    wait_artifacts_removed(&app.artifacts).await;
}

#[tokio::test]
async fn failed_analysis_is_reported_as_error() {
    let app = test_app(MockCompletionClient::failing());
    let id = upload(&app.router, "b.js", "eval(req.body)").await;

    let done = poll_terminal(&app.router, &id).await;
    assert_eq!(
        done,
        json!({ "id": id, "status": "error", "data": { "error": "Failed to analyze code" } })
    );
    wait_artifacts_removed(&app.artifacts).await;
}

#[tokio::test]
async fn unknown_id_is_404() {
    let app = test_app(MockCompletionClient::replying("x"));
    upload(&app.router, "a.py", "x = 1").await;

    let (status, j) = results(&app.router, "does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(j, json!({ "error": "Results not found" }));
}

#[tokio::test]
async fn missing_file_field_is_400_and_creates_no_job() {
    let app = test_app(MockCompletionClient::replying("x"));
    let (status, j) = send(&app.router, upload_request("attachment", "a.py", "x = 1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j, json!({ "error": "No file uploaded" }));
    assert!(app.store.is_empty().await);
    assert!(app.artifacts.is_empty().await);
}

#[tokio::test]
async fn non_multipart_request_is_400() {
    let app = test_app(MockCompletionClient::replying("x"));
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, j) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j["error"], "No file uploaded");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn empty_file_is_400() {
    let app = test_app(MockCompletionClient::replying("x"));
    let (status, _) = send(&app.router, upload_request("file", "empty.py", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn oversized_upload_is_413_and_creates_no_job() {
    let app = test_app_limited(64);
    let content = "a".repeat(4096);
    let (status, _) = send(&app.router, upload_request("file", "big.py", &content)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.store.is_empty().await);
    assert!(app.artifacts.is_empty().await);
}

#[tokio::test]
async fn save_failure_is_500() {
    let app = test_app_with(
        MockCompletionClient::replying("x"),
        InMemoryArtifactStore::failing_saves(),
    );
    let (status, j) = send(&app.router, upload_request("file", "a.py", "x = 1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(j, json!({ "error": "Failed to save file" }));
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app(MockCompletionClient::replying("x"));
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_uploads_keep_reports_separate() {
    const N: usize = 100;
    let llm = MockCompletionClient::new(|msgs| {
        let code = msgs
            .last()
            .and_then(|m| m.content.rsplit("\n\n").next())
            .unwrap_or_default();
        Ok(format!("<table><tr><td>{}</td></tr></table>", code))
    })
    .with_delay(Duration::from_millis(10));
    let app = test_app(llm);

    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let code = format!("secret_{} = 1", i);
            let id = upload(&router, &format!("f{}.py", i), &code).await;
            (id, code)
        }));
    }
    let mut jobs = Vec::with_capacity(N);
    for h in handles {
        jobs.push(h.await.unwrap());
    }
    let ids: HashSet<&str> = jobs.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids.len(), N);

    for (id, code) in &jobs {
        let done = poll_terminal(&app.router, id).await;
        assert_eq!(done["status"], "completed");
        assert_eq!(
            done["data"],
            format!("<table><tr><td>{}</td></tr></table>", code)
        );
    }
    assert_eq!(app.store.len().await, N);
    wait_artifacts_removed(&app.artifacts).await;
}
