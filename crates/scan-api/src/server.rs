//! Axum server and routes.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use scan_scheduler::{Scheduler, SchedulerError};
use scan_types::{ErrorResponse, Upload, UploadResponse};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Multipart field carrying the uploaded source file.
pub const FILE_FIELD: &str = "file";

pub struct AppState {
    pub scheduler: Arc<dyn Scheduler>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            max_upload_bytes: crate::config::ServerConfig::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/upload", post(handle_upload))
        .route("/results/:id", get(handle_results))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn no_file() -> Response {
    error(StatusCode::BAD_REQUEST, "No file uploaded")
}

async fn handle_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "upload is not multipart");
            return no_file();
        }
    };

    let upload = match read_file_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return no_file(),
        Err(e) => {
            tracing::debug!(error = %e, "malformed multipart upload");
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return error(StatusCode::PAYLOAD_TOO_LARGE, e.body_text());
            }
            return no_file();
        }
    };

    match state.scheduler.submit(upload).await {
        Ok(id) => (StatusCode::OK, Json(UploadResponse { id })).into_response(),
        Err(SchedulerError::EmptyUpload) => no_file(),
        Err(SchedulerError::Artifact(e)) => {
            tracing::error!(error = %e, "failed to save upload");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file")
        }
    }
}

/// First field named `file`; other fields are skipped.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<Upload>, axum::extract::multipart::MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(Upload::new(name, bytes.to_vec())));
    }
    Ok(None)
}

async fn handle_results(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.scheduler.get_status(&id).await {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Results not found"),
    }
}

async fn handle_health() -> &'static str {
    "ok"
}
