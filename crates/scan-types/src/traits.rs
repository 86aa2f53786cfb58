//! Traits for the job store and artifact storage backends.

use crate::{Artifact, JobRecord};
use async_trait::async_trait;

/// Concurrency-safe map from job id to job record.
///
/// Contract: `get` returns `None` when the id is unknown; that is a normal
/// outcome, not an error. Records are replaced as a whole.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Set the record for `record.id()` unconditionally.
    async fn insert(&self, record: JobRecord);

    /// Snapshot of the current record.
    async fn get(&self, id: &str) -> Option<JobRecord>;

    /// Move a `processing` record to the given terminal record.
    /// Refuses unknown ids, non-terminal records and records that already left `processing`.
    async fn finish(&self, record: JobRecord) -> Result<(), JobStoreError>;

    /// Number of records held.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Storage for uploaded files, namespaced by job id.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist the upload for `job_id`; returns the handle the worker will own.
    async fn save(&self, job_id: &str, name: &str, bytes: &[u8])
        -> Result<Artifact, ArtifactError>;

    /// Read the whole artifact.
    async fn read(&self, artifact: &Artifact) -> Result<Vec<u8>, ArtifactError>;

    /// Remove the artifact.
    async fn delete(&self, artifact: &Artifact) -> Result<(), ArtifactError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    UnknownJob(String),
    #[error("job {id} already {status}")]
    AlreadyTerminal {
        id: String,
        status: crate::JobStatus,
    },
    #[error("record for job {0} is not terminal")]
    NotTerminal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact not found: {0}")]
    NotFound(String),
}
