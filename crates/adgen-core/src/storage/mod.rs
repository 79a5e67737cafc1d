//! Artifact storage collaborators.
//!
//! The orchestrator only ever holds the reference returned by
//! [`ArtifactStorage::store`]; the bytes belong to the backend.

mod local;
mod memory;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::RawArtifact;

pub use local::LocalDirStorage;
pub use memory::MemoryStorage;

#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Persist one artifact and return an addressable reference to it.
    async fn store(&self, artifact: &RawArtifact) -> Result<String, StorageError>;
}

/// File extension for a generated image, from its declared content type.
pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("image/png") => "png",
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        Some("image/svg+xml") => "svg",
        _ => "bin",
    }
}
