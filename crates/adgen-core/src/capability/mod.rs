//! The external image generation capability.
//!
//! The core never looks inside a capability: it hands over a validated
//! request and gets back raw images in generation order, or an error.

mod placeholder;
mod remote;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::types::{GenerationRequest, RawArtifact};

pub use placeholder::PlaceholderCapability;
pub use remote::RemoteCapability;

#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Run one generation. The returned order is the order clients see.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<RawArtifact>, CapabilityError>;
}
