//! Job record: one analysis request from upload to terminal state.

use serde::Serialize;

/// Status of an analysis job. `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job data: the report text on success, `{"error": ...}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JobData {
    Report(String),
    Failure { error: String },
}

/// One job record. Built only through [`JobRecord::processing`],
/// [`JobRecord::completed`] and [`JobRecord::failed`], so `data` always agrees
/// with `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    id: String,
    data: Option<JobData>,
    status: JobStatus,
}

impl JobRecord {
    /// Initial record inserted at submission time.
    pub fn processing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: None,
            status: JobStatus::Processing,
        }
    }

    pub fn completed(id: impl Into<String>, report: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Some(JobData::Report(report.into())),
            status: JobStatus::Completed,
        }
    }

    pub fn failed(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: Some(JobData::Failure {
                error: detail.into(),
            }),
            status: JobStatus::Error,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn data(&self) -> Option<&JobData> {
        self.data.as_ref()
    }

    /// Report text; present only when completed.
    pub fn payload(&self) -> Option<&str> {
        match &self.data {
            Some(JobData::Report(r)) => Some(r),
            _ => None,
        }
    }

    /// Failure reason; present only on error.
    pub fn error_detail(&self) -> Option<&str> {
        match &self.data {
            Some(JobData::Failure { error }) => Some(error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn processing_serializes_with_null_data() {
        let rec = JobRecord::processing("j1");
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({ "id": "j1", "status": "processing", "data": null })
        );
        assert!(!rec.is_terminal());
        assert_eq!(rec.payload(), None);
        assert_eq!(rec.error_detail(), None);
    }

    #[test]
    fn completed_carries_report_as_string() {
        let rec = JobRecord::completed("j1", "<table>...</table>");
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({ "id": "j1", "status": "completed", "data": "<table>...</table>" })
        );
        assert_eq!(rec.payload(), Some("<table>...</table>"));
        assert!(rec.is_terminal());
    }

    #[test]
    fn failed_wraps_detail_in_error_object() {
        let rec = JobRecord::failed("j2", "Failed to analyze code");
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({ "id": "j2", "status": "error", "data": { "error": "Failed to analyze code" } })
        );
        assert_eq!(rec.error_detail(), Some("Failed to analyze code"));
        assert_eq!(rec.payload(), None);
    }
}
