use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{extension_for, ArtifactStorage};
use crate::error::StorageError;
use crate::types::RawArtifact;

/// Writes artifacts as files into one directory and hands out URLs under a
/// public prefix (e.g. `http://localhost:8000/static`).
///
/// File names are random UUIDs, so concurrent requests never collide and
/// no locking is needed.
#[derive(Debug, Clone)]
pub struct LocalDirStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalDirStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into();
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }
}

#[async_trait]
impl ArtifactStorage for LocalDirStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn store(&self, artifact: &RawArtifact) -> Result<String, StorageError> {
        if artifact.data.is_empty() {
            return Err(StorageError::Rejected("artifact has no data".into()));
        }

        let file_name = format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            extension_for(artifact.content_type.as_deref())
        );
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &artifact.data)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = artifact.data.len(), "artifact written");
        Ok(format!("{}/{}", self.public_prefix, file_name))
    }
}
