//! In-memory job store: one lock over the whole map, records replaced as a whole.

use async_trait::async_trait;
use scan_types::{JobRecord, JobStore, JobStoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Job records keyed by id, kept for the process lifetime.
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<String, JobRecord>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, record: JobRecord) {
        let mut guard = self.jobs.write().await;
        guard.insert(record.id().to_string(), record);
    }

    async fn get(&self, id: &str) -> Option<JobRecord> {
        let guard = self.jobs.read().await;
        guard.get(id).cloned()
    }

    async fn finish(&self, record: JobRecord) -> Result<(), JobStoreError> {
        if !record.is_terminal() {
            return Err(JobStoreError::NotTerminal(record.id().to_string()));
        }
        let mut guard = self.jobs.write().await;
        let current = guard
            .get_mut(record.id())
            .ok_or_else(|| JobStoreError::UnknownJob(record.id().to_string()))?;
        if current.is_terminal() {
            return Err(JobStoreError::AlreadyTerminal {
                id: record.id().to_string(),
                status: current.status(),
            });
        }
        *current = record;
        Ok(())
    }

    async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}
