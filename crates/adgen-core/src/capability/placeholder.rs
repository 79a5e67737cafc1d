use async_trait::async_trait;
use tracing::debug;

use super::GenerationCapability;
use crate::error::CapabilityError;
use crate::types::{GenerationRequest, RawArtifact};

const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Stand-in for a real model.
///
/// Produces `count` copies of the reference image so the whole request path
/// (storage, URLs, ordering) can run without a model. When the prompt has
/// lines, artifacts are tagged with prompt indexes round-robin.
#[derive(Debug, Clone)]
pub struct PlaceholderCapability {
    count: usize,
}

impl PlaceholderCapability {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for PlaceholderCapability {
    fn default() -> Self {
        Self::new(2)
    }
}

#[async_trait]
impl GenerationCapability for PlaceholderCapability {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawArtifact>, CapabilityError> {
        let reference = request.reference_image();
        let content_type = reference
            .content_type
            .clone()
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());
        let prompts = request.prompt_lines().len();

        debug!(
            count = self.count,
            prompts,
            product_images = request.product_images().len(),
            "placeholder generation"
        );

        Ok((0..self.count)
            .map(|i| {
                let artifact =
                    RawArtifact::new(reference.data.clone()).with_content_type(content_type.clone());
                if prompts > 0 {
                    artifact.with_prompt_index(i % prompts)
                } else {
                    artifact
                }
            })
            .collect())
    }
}
