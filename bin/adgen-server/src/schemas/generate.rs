//! OpenAPI shapes for `POST /generate`.
//!
//! These mirror the core types for documentation only; the handler works
//! with `adgen_core` types directly.
#![allow(dead_code)]

use serde::Serialize;
use utoipa::ToSchema;

/// Multipart body accepted by `POST /generate`.
#[derive(Debug, ToSchema)]
pub struct GenerateUpload {
    /// Reference advertisement image. Required, exactly once.
    #[schema(value_type = String, format = Binary)]
    pub sample_ad: Vec<u8>,
    /// Product images, repeat the field for each file. Order is kept.
    #[schema(value_type = Vec<String>)]
    pub product_images: Vec<Vec<u8>>,
    /// Free-text prompts, one product description per line.
    pub prompts_text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatusDoc {
    Success,
    Failure,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetailDoc {
    /// One of `missing_required_field`, `duplicate_field`, `invalid_field`,
    /// `malformed_payload`, `generation_capability_failure`, `storage_failure`.
    pub kind: String,
    pub message: String,
}

/// Body returned by `POST /generate`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerationResponseDoc {
    pub status: GenerationStatusDoc,
    /// Absolute URLs of the generated images, in generation order. Empty on
    /// failure.
    pub generated_images: Vec<String>,
    /// Present only when `status` is `failure`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetailDoc>,
}
