//! Upload storage: files under a local directory, or an in-memory map for tests.

use async_trait::async_trait;
use scan_types::{sanitize_file_name, Artifact, ArtifactError, ArtifactStore};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stores each upload as `<root>/<job_id>_<name>`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the root directory if missing.
    pub async fn ensure_root(&self) -> Result<(), ArtifactError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

fn map_io(err: std::io::Error, artifact: &Artifact) -> ArtifactError {
    if err.kind() == ErrorKind::NotFound {
        ArtifactError::NotFound(artifact.location.display().to_string())
    } else {
        ArtifactError::Io(err)
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn save(
        &self,
        job_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<Artifact, ArtifactError> {
        let name = sanitize_file_name(name);
        let location = self.root.join(format!("{}_{}", job_id, name));
        tokio::fs::write(&location, bytes).await?;
        Ok(Artifact {
            job_id: job_id.to_string(),
            name,
            location,
        })
    }

    async fn read(&self, artifact: &Artifact) -> Result<Vec<u8>, ArtifactError> {
        tokio::fs::read(&artifact.location)
            .await
            .map_err(|e| map_io(e, artifact))
    }

    async fn delete(&self, artifact: &Artifact) -> Result<(), ArtifactError> {
        tokio::fs::remove_file(&artifact.location)
            .await
            .map_err(|e| map_io(e, artifact))
    }
}

/// In-memory artifact store (process lifetime only). Failure switches let tests
/// drive the save and read error paths.
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    fail_saves: bool,
    fail_reads: bool,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `save` fails with an io error.
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Saves succeed, every `read` fails.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub async fn contains(&self, artifact: &Artifact) -> bool {
        self.files.read().await.contains_key(&artifact.location)
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn save(
        &self,
        job_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<Artifact, ArtifactError> {
        if self.fail_saves {
            return Err(ArtifactError::Io(std::io::Error::new(
                ErrorKind::Other,
                "save disabled",
            )));
        }
        let name = sanitize_file_name(name);
        let location = PathBuf::from(format!("{}_{}", job_id, name));
        self.files
            .write()
            .await
            .insert(location.clone(), bytes.to_vec());
        Ok(Artifact {
            job_id: job_id.to_string(),
            name,
            location,
        })
    }

    async fn read(&self, artifact: &Artifact) -> Result<Vec<u8>, ArtifactError> {
        if self.fail_reads {
            return Err(ArtifactError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "read disabled",
            )));
        }
        self.files
            .read()
            .await
            .get(&artifact.location)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(artifact.location.display().to_string()))
    }

    async fn delete(&self, artifact: &Artifact) -> Result<(), ArtifactError> {
        self.files
            .write()
            .await
            .remove(&artifact.location)
            .map(|_| ())
            .ok_or_else(|| ArtifactError::NotFound(artifact.location.display().to_string()))
    }
}
