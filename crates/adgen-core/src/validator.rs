//! Request Validator.
//!
//! Turns a transport-neutral [`RawPayload`] into a [`GenerationRequest`].
//! The server builds the payload from the axum multipart stream; tests
//! build it by hand.
//!
//! Rules:
//! - `sample_ad` must appear exactly once with a non-empty body.
//! - `product_images` may repeat any number of times; zero-length parts are
//!   dropped (browsers send one for an empty file input), the rest keep
//!   submission order.
//! - `prompts_text` is optional; absent and empty are both accepted and
//!   kept apart. The last occurrence wins.
//! - The camelCase names used by the web backend (`sampleAd`,
//!   `productImages`, `promptsText`) are aliases of the same fields.
//! - Unknown fields are ignored.

use bytes::Bytes;
use tracing::debug;

use crate::error::ValidationError;
use crate::types::{GenerationRequest, ImagePayload};

pub const SAMPLE_AD_FIELD: &str = "sample_ad";
pub const PRODUCT_IMAGES_FIELD: &str = "product_images";
pub const PROMPTS_TEXT_FIELD: &str = "prompts_text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    SampleAd,
    ProductImages,
    PromptsText,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sample_ad" | "sampleAd" => Some(Field::SampleAd),
            "product_images" | "productImages" | "product_images[]" => Some(Field::ProductImages),
            "prompts_text" | "promptsText" => Some(Field::PromptsText),
            _ => None,
        }
    }
}

/// One named part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl RawPart {
    pub fn file(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::file(name, Bytes::from(value.into()))
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn into_image(self) -> ImagePayload {
        ImagePayload {
            data: self.data,
            file_name: self.file_name.filter(|n| !n.is_empty()),
            content_type: self.content_type,
        }
    }
}

/// The parts of a multipart body, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    parts: Vec<RawPart>,
}

impl RawPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: RawPart) {
        self.parts.push(part);
    }

    pub fn with_part(mut self, part: RawPart) -> Self {
        self.push(part);
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[RawPart] {
        &self.parts
    }
}

impl FromIterator<RawPart> for RawPayload {
    fn from_iter<I: IntoIterator<Item = RawPart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

/// Validate a raw payload. Reads only; nothing is persisted.
pub fn validate(payload: RawPayload) -> Result<GenerationRequest, ValidationError> {
    let mut reference: Option<ImagePayload> = None;
    let mut products = Vec::new();
    let mut prompt: Option<String> = None;

    for part in payload.parts {
        let Some(field) = Field::from_name(&part.name) else {
            debug!(field = %part.name, "ignoring unknown multipart field");
            continue;
        };

        match field {
            Field::SampleAd => {
                if part.data.is_empty() {
                    debug!("ignoring empty sample_ad part");
                    continue;
                }
                if reference.is_some() {
                    return Err(ValidationError::DuplicateField {
                        field: SAMPLE_AD_FIELD,
                    });
                }
                reference = Some(part.into_image());
            }
            Field::ProductImages => {
                if part.data.is_empty() {
                    debug!("ignoring empty product_images part");
                    continue;
                }
                products.push(part.into_image());
            }
            Field::PromptsText => {
                let text = String::from_utf8(part.data.to_vec()).map_err(|e| {
                    ValidationError::InvalidField {
                        field: PROMPTS_TEXT_FIELD,
                        reason: format!("not valid UTF-8: {e}"),
                    }
                })?;
                prompt = Some(text);
            }
        }
    }

    let reference = reference.ok_or(ValidationError::MissingRequiredField {
        field: SAMPLE_AD_FIELD,
    })?;

    debug!(
        reference_bytes = reference.len(),
        product_images = products.len(),
        has_prompt = prompt.is_some(),
        "payload validated"
    );

    GenerationRequest::new(reference, products, prompt)
}
