use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ArtifactStorage;
use crate::error::StorageError;
use crate::types::RawArtifact;

pub const MEMORY_SCHEME: &str = "memory://";

/// In-process artifact store handing out `memory://<id>` references.
///
/// Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<HashMap<String, RawArtifact>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored artifact by the reference `store` returned.
    pub async fn get(&self, reference: &str) -> Option<RawArtifact> {
        let id = reference.strip_prefix(MEMORY_SCHEME)?;
        self.inner.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn store(&self, artifact: &RawArtifact) -> Result<String, StorageError> {
        let id = Uuid::new_v4().simple().to_string();
        self.inner.write().await.insert(id.clone(), artifact.clone());
        Ok(format!("{MEMORY_SCHEME}{id}"))
    }
}
