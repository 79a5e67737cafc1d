//! Image generation upload endpoint.
//!
//! `POST /generate` (also mounted at `/api/generate`) reads the multipart
//! body into raw parts and hands them to the orchestrator. Field rules live
//! in `adgen_core::validator`; this module only moves bytes.

use std::sync::Arc;

use adgen_core::{GenerationResponse, RawPart, RawPayload};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::generate::{
    ErrorDetailDoc, GenerateUpload, GenerationResponseDoc, GenerationStatusDoc,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(generate),
    components(schemas(
        GenerateUpload,
        GenerationResponseDoc,
        GenerationStatusDoc,
        ErrorDetailDoc
    ))
)]
pub struct GenerateApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/api/generate", post(generate))
}

/// Generate advertisement images from a reference ad.
///
/// Expects `multipart/form-data` with exactly one `sample_ad` file, any
/// number of `product_images` files and an optional `prompts_text` field.
#[utoipa::path(
    post,
    path = "/generate",
    tag = "generate",
    request_body(content = GenerateUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images generated", body = GenerationResponseDoc),
        (status = 400, description = "Malformed or invalid upload", body = GenerationResponseDoc),
        (status = 413, description = "Upload exceeds the size limit", body = GenerationResponseDoc),
        (status = 502, description = "Generation or storage failed", body = GenerationResponseDoc),
    )
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, ServerError> {
    let mut multipart = multipart?;
    let mut payload = RawPayload::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await?;
        debug!(field = %name, bytes = data.len(), "multipart field read");

        payload.push(RawPart {
            name,
            file_name,
            content_type,
            data,
        });
    }

    let response = state.orchestrator.handle(payload).await?;
    if response.is_success() {
        Ok(Json(response))
    } else {
        Err(ServerError::Generation(response))
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use adgen_core::{
        CapabilityError, GenerationCapability, GenerationRequest, MemoryStorage, Orchestrator,
        RawArtifact,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::middleware::trace::X_TRACE_ID;
    use crate::routes;

    use super::*;

    const BOUNDARY: &str = "adgen-test-boundary";

    struct Scripted {
        outputs: Vec<&'static [u8]>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(outputs: &[&'static [u8]]) -> Arc<Self> {
            Arc::new(Self {
                outputs: outputs.to_vec(),
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                outputs: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerationCapability for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<Vec<RawArtifact>, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CapabilityError::Model("gpu at /opt/secret fell over".into()));
            }
            Ok(self
                .outputs
                .iter()
                .map(|b| RawArtifact::new(*b).with_content_type("image/png"))
                .collect())
        }
    }

    fn app(capability: Arc<Scripted>, storage: MemoryStorage, config: Config) -> Router {
        let orchestrator = Orchestrator::new(capability, Arc::new(storage));
        routes::build(Arc::new(AppState::new(config, orchestrator)))
    }

    fn test_config() -> Config {
        Config {
            enable_swagger: false,
            output_dir: std::env::temp_dir().join("adgen_routes_test"),
            ..Config::default()
        }
    }

    /// `(name, filename, bytes)`; a filename marks the part as a file.
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(path: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn successful_upload_returns_urls_in_generation_order() {
        let capability = Scripted::ok(&[b"first", b"second"]);
        let storage = MemoryStorage::new();
        let app = app(capability.clone(), storage.clone(), test_config());

        let body = multipart_body(&[
            ("sample_ad", Some("ad.png"), b"reference"),
            ("product_images", Some("p1.png"), b"product-1"),
            ("prompts_text", None, b"red sneakers\nblue bag"),
        ]);
        let response = app.oneshot(upload("/generate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        assert!(body.get("error").is_none());

        let urls = body["generated_images"].as_array().unwrap();
        assert_eq!(urls.len(), 2);
        let first = storage.get(urls[0].as_str().unwrap()).await.unwrap();
        let second = storage.get(urls[1].as_str().unwrap()).await.unwrap();
        assert_eq!(&first.data[..], b"first");
        assert_eq!(&second.data[..], b"second");
        assert_eq!(capability.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn api_prefixed_alias_is_served() {
        let capability = Scripted::ok(&[b"only"]);
        let app = app(capability, MemoryStorage::new(), test_config());

        let body = multipart_body(&[("sampleAd", Some("ad.png"), b"reference")]);
        let response = app.oneshot(upload("/api/generate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["generated_images"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_sample_ad_is_rejected_before_generation() {
        let capability = Scripted::ok(&[b"never"]);
        let storage = MemoryStorage::new();
        let app = app(capability.clone(), storage.clone(), test_config());

        let body = multipart_body(&[
            ("product_images", Some("p1.png"), b"product-1"),
            ("prompts_text", None, b"red sneakers"),
        ]);
        let response = app.oneshot(upload("/generate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["generated_images"], serde_json::json!([]));
        assert_eq!(body["error"]["kind"], "missing_required_field");
        assert_eq!(capability.calls.load(Ordering::SeqCst), 0);
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn capability_failure_is_bad_gateway_without_internals() {
        let app = app(Scripted::failing(), MemoryStorage::new(), test_config());

        let body = multipart_body(&[("sample_ad", Some("ad.png"), b"reference")]);
        let response = app.oneshot(upload("/generate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["error"]["kind"], "generation_capability_failure");
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn non_multipart_body_gets_structured_bad_request() {
        let capability = Scripted::ok(&[b"never"]);
        let app = app(capability.clone(), MemoryStorage::new(), test_config());

        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"sample_ad":"nope"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["error"]["kind"], "malformed_payload");
        assert_eq!(capability.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let capability = Scripted::ok(&[b"never"]);
        let config = Config {
            max_upload_size_mb: 1,
            ..test_config()
        };
        let app = app(capability.clone(), MemoryStorage::new(), config);

        let big = vec![0u8; 1024 * 1024 + 1];
        let body = multipart_body(&[("sample_ad", Some("ad.png"), &big)]);
        let response = app.oneshot(upload("/generate", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(capability.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn trace_id_is_echoed_on_response() {
        let app = app(Scripted::ok(&[b"one"]), MemoryStorage::new(), test_config());
        let trace_id = uuid::Uuid::new_v4().to_string();

        let body = multipart_body(&[("sample_ad", Some("ad.png"), b"reference")]);
        let mut request = upload("/generate", body);
        request
            .headers_mut()
            .insert(X_TRACE_ID, trace_id.parse().unwrap());
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(X_TRACE_ID).unwrap().to_str().unwrap(),
            trace_id
        );
    }
}
