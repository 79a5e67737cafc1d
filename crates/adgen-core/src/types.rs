use bytes::Bytes;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

use crate::error::ValidationError;
use crate::validator::SAMPLE_AD_FIELD;

/// One uploaded image, kept exactly as the client sent it.
///
/// No decoding happens here: malformed bytes travel through untouched and
/// are the capability's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImagePayload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A validated generation request.
///
/// The reference image is private so the only ways to obtain a request are
/// [`GenerationRequest::new`] and the validator, both of which guarantee it
/// is non-empty.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    reference_image: ImagePayload,
    product_images: Vec<ImagePayload>,
    prompt_text: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        reference_image: ImagePayload,
        product_images: Vec<ImagePayload>,
        prompt_text: Option<String>,
    ) -> Result<Self, ValidationError> {
        if reference_image.is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: SAMPLE_AD_FIELD,
            });
        }
        Ok(Self {
            reference_image,
            product_images,
            prompt_text,
        })
    }

    pub fn reference_image(&self) -> &ImagePayload {
        &self.reference_image
    }

    /// Product images in submission order.
    pub fn product_images(&self) -> &[ImagePayload] {
        &self.product_images
    }

    /// The prompt exactly as submitted; `Some("")` and `None` are both valid.
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt_text.as_deref()
    }

    /// Prompt text split into one description per line, trimmed, blanks
    /// removed.
    pub fn prompt_lines(&self) -> Vec<&str> {
        self.prompt_text
            .as_deref()
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One image as returned by a generation capability, before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArtifact {
    pub data: Bytes,
    pub content_type: Option<String>,
    /// Index into [`GenerationRequest::prompt_lines`] this image was made for.
    pub prompt_index: Option<usize>,
}

impl RawArtifact {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
            prompt_index: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_prompt_index(mut self, index: usize) -> Self {
        self.prompt_index = Some(index);
        self
    }
}

/// A stored artifact. Only the reference is held here; the bytes belong to
/// the storage backend.
///
/// Serializes as its bare URL so the response body stays a list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub url: String,
    pub content_type: Option<String>,
    pub prompt_index: Option<usize>,
}

impl Serialize for GeneratedArtifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Failure,
}

/// Failure classes reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The reference image was absent or empty.
    MissingRequiredField,
    /// A single-valued field was supplied more than once.
    DuplicateField,
    /// A field was present but unusable (e.g. a non UTF-8 prompt).
    InvalidField,
    /// The body could not be read as multipart at all.
    MalformedPayload,
    GenerationCapabilityFailure,
    StorageFailure,
}

impl ErrorKind {
    /// `true` for failures caused by the request itself, detected before
    /// any generation is attempted.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingRequiredField
                | ErrorKind::DuplicateField
                | ErrorKind::InvalidField
                | ErrorKind::MalformedPayload
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

/// The body returned for every generation call, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResponse {
    pub status: GenerationStatus,
    pub generated_images: Vec<GeneratedArtifact>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
}

impl GenerationResponse {
    pub fn success(generated_images: Vec<GeneratedArtifact>) -> Self {
        Self {
            status: GenerationStatus::Success,
            generated_images,
            error_detail: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Failure,
            generated_images: Vec::new(),
            error_detail: Some(ErrorDetail {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }

    pub fn urls(&self) -> Vec<&str> {
        self.generated_images.iter().map(|a| a.url.as_str()).collect()
    }
}

impl From<&ValidationError> for GenerationResponse {
    fn from(err: &ValidationError) -> Self {
        GenerationResponse::failure(err.kind(), err.to_string())
    }
}

/// Lifecycle of a single request. Only ever logged, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RequestState {
    #[strum(serialize = "received")]
    Received,
    #[strum(serialize = "validated")]
    Validated,
    #[strum(serialize = "rejected")]
    Rejected,
    #[strum(serialize = "dispatched")]
    Dispatched,
    #[strum(serialize = "completed.success")]
    CompletedSuccess,
    #[strum(serialize = "completed.failure")]
    CompletedFailure,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Rejected | RequestState::CompletedSuccess | RequestState::CompletedFailure
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_reference_image_is_rejected() {
        let err = GenerationRequest::new(ImagePayload::new(Vec::new()), Vec::new(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    }

    #[test]
    fn prompt_lines_skip_blank_lines() {
        let request = GenerationRequest::new(
            ImagePayload::new(vec![1u8]),
            Vec::new(),
            Some("  perfume on marble \n\n\tskincare cream\n   ".to_owned()),
        )
        .expect("valid request");
        assert_eq!(request.prompt_lines(), vec!["perfume on marble", "skincare cream"]);
    }

    #[test]
    fn prompt_lines_empty_when_prompt_absent_or_empty() {
        let absent =
            GenerationRequest::new(ImagePayload::new(vec![1u8]), Vec::new(), None).unwrap();
        let empty = GenerationRequest::new(
            ImagePayload::new(vec![1u8]),
            Vec::new(),
            Some(String::new()),
        )
        .unwrap();
        assert!(absent.prompt_lines().is_empty());
        assert!(empty.prompt_lines().is_empty());
        assert_eq!(absent.prompt_text(), None);
        assert_eq!(empty.prompt_text(), Some(""));
    }

    #[test]
    fn success_serializes_urls_only() {
        let response = GenerationResponse::success(vec![
            GeneratedArtifact {
                url: "http://host/static/a.png".into(),
                content_type: Some("image/png".into()),
                prompt_index: Some(0),
            },
            GeneratedArtifact {
                url: "http://host/static/b.png".into(),
                content_type: None,
                prompt_index: None,
            },
        ]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "success",
                "generated_images": ["http://host/static/a.png", "http://host/static/b.png"],
            })
        );
    }

    #[test]
    fn failure_carries_error_and_empty_list() {
        let response =
            GenerationResponse::failure(ErrorKind::GenerationCapabilityFailure, "image generation failed");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["generated_images"], serde_json::json!([]));
        assert_eq!(value["error"]["kind"], "generation_capability_failure");
        assert_eq!(value["error"]["message"], "image generation failed");
    }

    #[test]
    fn client_error_kinds() {
        assert!(ErrorKind::MissingRequiredField.is_client_error());
        assert!(ErrorKind::MalformedPayload.is_client_error());
        assert!(!ErrorKind::StorageFailure.is_client_error());
        assert!(!ErrorKind::GenerationCapabilityFailure.is_client_error());
        assert_eq!(ErrorKind::StorageFailure.to_string(), "storage_failure");
    }

    #[test]
    fn terminal_states() {
        assert!(RequestState::Rejected.is_terminal());
        assert!(RequestState::CompletedFailure.is_terminal());
        assert!(!RequestState::Dispatched.is_terminal());
        assert_eq!(RequestState::CompletedSuccess.to_string(), "completed.success");
    }
}
