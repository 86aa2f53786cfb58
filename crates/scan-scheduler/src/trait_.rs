//! Scheduler trait: submit analysis job, get status.

use async_trait::async_trait;
use scan_types::{ArtifactError, JobRecord, Upload};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("no file content uploaded")]
    EmptyUpload,
    #[error("failed to persist upload: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Scheduler for async analysis: submit returns job_id, status can be polled.
///
/// Contract: `get_status` returns `None` when the job_id is unknown. The API layer
/// maps `None` to HTTP 404.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Persist the upload, register a `processing` record and start the worker
    /// without waiting for it. Returns the new job id.
    async fn submit(&self, upload: Upload) -> Result<String, SchedulerError>;

    /// Current record for `job_id`.
    async fn get_status(&self, job_id: &str) -> Option<JobRecord>;
}
