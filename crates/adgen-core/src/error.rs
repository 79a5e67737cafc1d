use std::path::PathBuf;

use thiserror::Error;

use crate::types::ErrorKind;

/// Reasons a raw payload is rejected before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: &'static str },

    #[error("field `{field}` must be supplied at most once")]
    DuplicateField { field: &'static str },

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The transport could not split the body into parts.
    #[error("malformed multipart payload: {0}")]
    MalformedPayload(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            ValidationError::DuplicateField { .. } => ErrorKind::DuplicateField,
            ValidationError::InvalidField { .. } => ErrorKind::InvalidField,
            ValidationError::MalformedPayload(_) => ErrorKind::MalformedPayload,
        }
    }
}

/// Failures raised by a [`GenerationCapability`].
///
/// None of these messages reach the client; the orchestrator logs them and
/// answers with an opaque failure.
///
/// [`GenerationCapability`]: crate::capability::GenerationCapability
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The capability could not make use of the supplied images or prompt.
    #[error("capability rejected the input: {0}")]
    InvalidInput(String),

    /// The model itself failed.
    #[error("model failure: {0}")]
    Model(String),

    #[error("generation timed out")]
    Timeout,

    #[error("failed to reach the generation service")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with a non-success status.
    #[error("generation service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The remote service answered with something we could not decode.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Failures raised while persisting a generated artifact.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write artifact to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact rejected by storage: {0}")]
    Rejected(String),
}
