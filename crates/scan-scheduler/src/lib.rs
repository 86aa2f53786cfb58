//! Async analysis scheduler: submit returns a job id immediately, a detached worker
//! carries the job to `completed` or `error`, status can be polled.

mod artifact;
mod memory;
mod store;
mod trait_;
mod worker;

pub use artifact::{FsArtifactStore, InMemoryArtifactStore};
pub use memory::InMemoryScheduler;
pub use store::InMemoryJobStore;
pub use trait_::{Scheduler, SchedulerError};
pub use worker::{
    AnalysisError, AnalysisWorker, WorkerConfig, ANALYSIS_FAILED_DETAIL, READ_FAILED_DETAIL,
};

pub use scan_types::{
    Artifact, ArtifactError, ArtifactStore, JobRecord, JobStatus, JobStore, Upload,
};
