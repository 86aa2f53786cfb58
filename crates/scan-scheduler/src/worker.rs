//! Analysis worker: carries one job from `processing` to `completed` or `error`.

use scan_llm::{CompletionClient, LLMError, PromptTemplate};
use scan_types::{Artifact, ArtifactError, ArtifactStore, JobRecord, JobStatus, JobStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Detail stored on the job when the upload cannot be read.
pub const READ_FAILED_DETAIL: &str = "Failed to read file";
/// Detail stored on the job when the completion call fails or times out.
pub const ANALYSIS_FAILED_DETAIL: &str = "Failed to analyze code";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Absolute bound on one completion call, measured from invocation start.
    pub deadline: Duration,
}

impl WorkerConfig {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            deadline: Self::DEFAULT_DEADLINE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("read artifact: {0}")]
    ReadArtifact(#[from] ArtifactError),
    #[error("completion: {0}")]
    Completion(#[from] LLMError),
    #[error("completion exceeded deadline of {0:?}")]
    Timeout(Duration),
    #[error("analysis task aborted: {0}")]
    Aborted(String),
}

impl AnalysisError {
    /// Client-facing failure reason recorded on the job.
    pub fn detail(&self) -> &'static str {
        match self {
            AnalysisError::ReadArtifact(_) => READ_FAILED_DETAIL,
            AnalysisError::Completion(_)
            | AnalysisError::Timeout(_)
            | AnalysisError::Aborted(_) => ANALYSIS_FAILED_DETAIL,
        }
    }
}

/// Runs a single analysis attempt per job. No retries.
#[derive(Clone)]
pub struct AnalysisWorker {
    store: Arc<dyn JobStore>,
    artifacts: Arc<dyn ArtifactStore>,
    llm: Arc<dyn CompletionClient>,
    prompt: Arc<PromptTemplate>,
    config: WorkerConfig,
}

impl AnalysisWorker {
    pub fn new(
        store: Arc<dyn JobStore>,
        artifacts: Arc<dyn ArtifactStore>,
        llm: Arc<dyn CompletionClient>,
        prompt: PromptTemplate,
        config: WorkerConfig,
    ) -> Self {
        Self {
            store,
            artifacts,
            llm,
            prompt: Arc::new(prompt),
            config,
        }
    }

    /// Analyze the artifact, write the terminal record, then delete the artifact.
    /// The artifact is removed on every path, including a failed read or a panic
    /// inside the completion client.
    pub async fn run(&self, job_id: String, artifact: Artifact) -> JobStatus {
        let started = Instant::now();
        let analysis = {
            let this = self.clone();
            let artifact = artifact.clone();
            tokio::spawn(async move { this.analyze(&artifact).await })
        };
        let outcome = match analysis.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AnalysisError::Aborted(e.to_string())),
        };
        let record = match outcome {
            Ok(report) => JobRecord::completed(&job_id, report),
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "analysis failed");
                JobRecord::failed(&job_id, e.detail())
            }
        };
        let status = record.status();

        if let Err(e) = self.store.finish(record).await {
            tracing::warn!(job_id = %job_id, error = %e, "terminal record refused");
        }
        if let Err(e) = self.artifacts.delete(&artifact).await {
            tracing::warn!(
                job_id = %job_id,
                artifact = %artifact.location.display(),
                error = %e,
                "failed to remove upload"
            );
        }

        tracing::info!(
            job_id = %job_id,
            status = %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis job finished"
        );
        status
    }

    async fn analyze(&self, artifact: &Artifact) -> Result<String, AnalysisError> {
        let bytes = self.artifacts.read(artifact).await?;
        let code = String::from_utf8_lossy(&bytes);
        let messages = self.prompt.render(&code);

        let report = tokio::time::timeout(
            self.config.deadline,
            self.llm.complete_with_messages(&messages),
        )
        .await
        .map_err(|_| AnalysisError::Timeout(self.config.deadline))??;

        if report.trim().is_empty() {
            return Err(LLMError::EmptyResponse.into());
        }
        Ok(report)
    }
}
