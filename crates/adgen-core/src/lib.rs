//! adgen-core: request ingestion and response contract for ad variation
//! generation.
//!
//! A raw multipart payload goes through the [`validator`] and becomes a
//! [`GenerationRequest`]. The [`Orchestrator`] hands it to a
//! [`GenerationCapability`], persists each produced image through an
//! [`ArtifactStorage`] and always answers with a well-formed
//! [`GenerationResponse`].

pub mod capability;
pub mod error;
pub mod orchestrator;
pub mod storage;
pub mod types;
pub mod validator;


pub use capability::{GenerationCapability, PlaceholderCapability, RemoteCapability};
pub use error::{CapabilityError, StorageError, ValidationError};
pub use orchestrator::Orchestrator;
pub use storage::{ArtifactStorage, LocalDirStorage, MemoryStorage};
pub use types::{
    ErrorDetail, ErrorKind, GeneratedArtifact, GenerationRequest, GenerationResponse,
    GenerationStatus, ImagePayload, RawArtifact, RequestState,
};
pub use validator::{RawPart, RawPayload};
