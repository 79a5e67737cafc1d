//! Unified server error type.
//!
//! Handlers return `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Every variant is rendered with the same
//! JSON shape as a failed generation:
//!
//! ```json
//! { "status": "failure", "generated_images": [], "error": { "kind": "...", "message": "..." } }
//! ```
//!
//! so clients never see a bare framework error page.

use adgen_core::{ErrorKind, GenerationResponse, ValidationError};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The request did not carry a multipart body at all.
    #[error("multipart rejected: {0}")]
    Rejection(#[from] MultipartRejection),

    /// The multipart body broke off or exceeded the size limit.
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// The parts were readable but did not form a valid request.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Generation was dispatched and failed; carries the response to send.
    #[error("generation failed")]
    Generation(GenerationResponse),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Rejection(r) => r.status(),
            ServerError::Multipart(e) => e.status(),
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Generation(response) => match response.error_detail.as_ref().map(|d| d.kind) {
                Some(kind) if kind.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ServerError::Rejection(r) => {
                warn!(error = %r, "multipart extractor rejected request");
                GenerationResponse::failure(ErrorKind::MalformedPayload, r.body_text())
            }
            ServerError::Multipart(e) => {
                warn!(error = %e, status = status.as_u16(), "failed to read multipart body");
                GenerationResponse::failure(ErrorKind::MalformedPayload, e.body_text())
            }
            ServerError::Validation(e) => GenerationResponse::from(&e),
            ServerError::Generation(response) => {
                error!(
                    kind = ?response.error_detail.as_ref().map(|d| d.kind),
                    "generation request failed"
                );
                response
            }
        };
        (status, Json(body)).into_response()
    }
}
