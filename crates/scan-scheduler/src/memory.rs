//! In-memory scheduler: job state in a shared store, one detached worker task per submission.

use crate::{AnalysisWorker, Scheduler, SchedulerError, WorkerConfig};
use async_trait::async_trait;
use scan_llm::{CompletionClient, PromptTemplate};
use scan_types::{ArtifactStore, JobRecord, JobStore, Upload};
use std::sync::Arc;
use uuid::Uuid;

/// Scheduler backed by an injected job store. Every accepted upload gets its own
/// spawned worker; there is no cap on concurrently running jobs.
pub struct InMemoryScheduler {
    store: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    worker: AnalysisWorker,
}

impl InMemoryScheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        artifacts: Arc<dyn ArtifactStore>,
        llm: Arc<dyn CompletionClient>,
        prompt: PromptTemplate,
        config: WorkerConfig,
    ) -> Self {
        let worker = AnalysisWorker::new(
            Arc::clone(&store),
            Arc::clone(&artifacts),
            llm,
            prompt,
            config,
        );
        Self {
            store,
            artifacts,
            worker,
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    /// Spawns the worker with `tokio::spawn`; call from within a runtime.
    async fn submit(&self, upload: Upload) -> Result<String, SchedulerError> {
        if upload.is_empty() {
            return Err(SchedulerError::EmptyUpload);
        }
        let job_id = Uuid::new_v4().to_string();
        let artifact = self
            .artifacts
            .save(&job_id, &upload.name, &upload.bytes)
            .await?;

        // Visible as processing before the worker can run.
        self.store.insert(JobRecord::processing(&job_id)).await;

        let worker = self.worker.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            worker.run(id, artifact).await;
        });

        tracing::info!(
            job_id = %job_id,
            file = %upload.name,
            bytes = upload.bytes.len(),
            "analysis job submitted"
        );
        Ok(job_id)
    }

    async fn get_status(&self, job_id: &str) -> Option<JobRecord> {
        self.store.get(job_id).await
    }
}
