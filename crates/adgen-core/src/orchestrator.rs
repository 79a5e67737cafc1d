//! Generation Orchestrator.
//!
//! Drives one request from validation to a [`GenerationResponse`]:
//!
//! ```text
//! Received ─▶ Validated ─▶ Dispatched ─▶ Completed(success)
//!    │                         └──────▶ Completed(failure)
//!    └──▶ Rejected
//! ```
//!
//! Collaborators are passed in explicitly and shared behind `Arc`; the
//! orchestrator itself holds no per-request state and can serve any number
//! of concurrent requests.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::capability::GenerationCapability;
use crate::error::ValidationError;
use crate::storage::ArtifactStorage;
use crate::types::{
    ErrorKind, GeneratedArtifact, GenerationRequest, GenerationResponse, RequestState,
};
use crate::validator::{self, RawPayload};

/// Client-facing messages. Internal error text is only ever logged.
const CAPABILITY_FAILED: &str = "image generation failed";
const NOTHING_GENERATED: &str = "no images were generated";
const STORAGE_FAILED: &str = "generated images could not be stored";

#[derive(Clone)]
pub struct Orchestrator {
    capability: Arc<dyn GenerationCapability>,
    storage: Arc<dyn ArtifactStorage>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("capability", &self.capability.name())
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        capability: Arc<dyn GenerationCapability>,
        storage: Arc<dyn ArtifactStorage>,
    ) -> Self {
        Self {
            capability,
            storage,
        }
    }

    pub fn capability_name(&self) -> &str {
        self.capability.name()
    }

    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    /// Validate a raw payload and, if it passes, dispatch it.
    ///
    /// Rejections come back as `Err` so the transport can answer with a
    /// client error; every dispatched request yields `Ok`, whatever the
    /// outcome.
    pub async fn handle(&self, payload: RawPayload) -> Result<GenerationResponse, ValidationError> {
        debug!(state = %RequestState::Received, parts = payload.len(), "generation request");

        let request = match validator::validate(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(state = %RequestState::Rejected, error = %e, "request rejected");
                return Err(e);
            }
        };
        debug!(state = %RequestState::Validated, "request validated");

        Ok(self.dispatch(&request).await)
    }

    /// Run a validated request through the capability exactly once and
    /// store what it produced.
    ///
    /// Never fails: capability and storage errors become a `failure`
    /// response. Artifacts that fail to store are dropped; the request only
    /// fails if none could be stored. Response order is the capability's
    /// order.
    pub async fn dispatch(&self, request: &GenerationRequest) -> GenerationResponse {
        info!(
            state = %RequestState::Dispatched,
            capability = self.capability.name(),
            reference_bytes = request.reference_image().len(),
            product_images = request.product_images().len(),
            "dispatching generation"
        );

        let raw = match self.capability.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    state = %RequestState::CompletedFailure,
                    capability = self.capability.name(),
                    error = %e,
                    "generation capability failed"
                );
                return GenerationResponse::failure(
                    ErrorKind::GenerationCapabilityFailure,
                    CAPABILITY_FAILED,
                );
            }
        };

        if raw.is_empty() {
            warn!(
                state = %RequestState::CompletedFailure,
                capability = self.capability.name(),
                "capability produced no artifacts"
            );
            return GenerationResponse::failure(
                ErrorKind::GenerationCapabilityFailure,
                NOTHING_GENERATED,
            );
        }

        // Stores run concurrently; join_all keeps input order.
        let stored = join_all(raw.iter().map(|artifact| self.storage.store(artifact))).await;

        let produced = raw.len();
        let mut generated = Vec::with_capacity(produced);
        for (index, (artifact, result)) in raw.into_iter().zip(stored).enumerate() {
            match result {
                Ok(url) => generated.push(GeneratedArtifact {
                    url,
                    content_type: artifact.content_type,
                    prompt_index: artifact.prompt_index,
                }),
                Err(e) => warn!(
                    index,
                    storage = self.storage.name(),
                    error = %e,
                    "failed to store artifact; dropping it"
                ),
            }
        }

        if generated.is_empty() {
            error!(
                state = %RequestState::CompletedFailure,
                storage = self.storage.name(),
                produced,
                "no artifact could be stored"
            );
            return GenerationResponse::failure(ErrorKind::StorageFailure, STORAGE_FAILED);
        }

        info!(
            state = %RequestState::CompletedSuccess,
            produced,
            stored = generated.len(),
            "generation completed"
        );
        GenerationResponse::success(generated)
    }
}
