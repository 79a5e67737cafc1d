use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use super::GenerationCapability;
use crate::error::CapabilityError;
use crate::types::{GenerationRequest, ImagePayload, RawArtifact};
use crate::validator::{PRODUCT_IMAGES_FIELD, PROMPTS_TEXT_FIELD, SAMPLE_AD_FIELD};

/// Upstream error bodies are cut to this many bytes before they are logged.
const MAX_ERROR_BODY: usize = 512;

/// Forwards requests to an external inference service over HTTP.
///
/// The request is re-encoded as multipart with the same field names the
/// server accepts. The service must answer with
/// `{"images": ["<base64>", ...]}` or
/// `{"images": [{"b64_json": "...", "content_type": "...", "prompt_index": 0}]}`.
#[derive(Debug, Clone)]
pub struct RemoteCapability {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    images: Vec<RemoteImage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteImage {
    Encoded(String),
    Detailed {
        b64_json: String,
        #[serde(default)]
        content_type: Option<String>,
        #[serde(default)]
        prompt_index: Option<usize>,
    },
}

impl RemoteCapability {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CapabilityError::Transport { source })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: &GenerationRequest) -> Result<Form, CapabilityError> {
        let mut form = Form::new().part(
            SAMPLE_AD_FIELD,
            image_part(request.reference_image(), SAMPLE_AD_FIELD)?,
        );
        for (i, image) in request.product_images().iter().enumerate() {
            let fallback = format!("product_{i}");
            form = form.part(PRODUCT_IMAGES_FIELD, image_part(image, &fallback)?);
        }
        if let Some(prompt) = request.prompt_text() {
            form = form.text(PROMPTS_TEXT_FIELD, prompt.to_owned());
        }
        Ok(form)
    }
}

fn image_part(image: &ImagePayload, fallback_name: &str) -> Result<Part, CapabilityError> {
    let part = Part::bytes(image.data.to_vec()).file_name(
        image
            .file_name
            .clone()
            .unwrap_or_else(|| fallback_name.to_owned()),
    );
    match &image.content_type {
        Some(mime) => part.mime_str(mime).map_err(|e| {
            CapabilityError::InvalidInput(format!("invalid content type '{mime}': {e}"))
        }),
        None => Ok(part),
    }
}

fn decode_image(image: RemoteImage) -> Result<RawArtifact, CapabilityError> {
    let (encoded, content_type, prompt_index) = match image {
        RemoteImage::Encoded(encoded) => (encoded, None, None),
        RemoteImage::Detailed {
            b64_json,
            content_type,
            prompt_index,
        } => (b64_json, content_type, prompt_index),
    };
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| CapabilityError::MalformedResponse(format!("invalid base64 image: {e}")))?;
    Ok(RawArtifact {
        data: data.into(),
        content_type,
        prompt_index,
    })
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_owned();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[async_trait]
impl GenerationCapability for RemoteCapability {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawArtifact>, CapabilityError> {
        let form = Self::build_form(request)?;
        debug!(endpoint = %self.endpoint, "forwarding generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    CapabilityError::Timeout
                } else {
                    CapabilityError::Transport { source }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Upstream {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let body: RemoteResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        let artifacts = body
            .images
            .into_iter()
            .map(decode_image)
            .collect::<Result<Vec<_>, _>>()?;

        info!(images = artifacts.len(), "remote generation finished");
        Ok(artifacts)
    }
}
