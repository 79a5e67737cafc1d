use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Wraps each request in an `http_request` span carrying a trace id.
///
/// A valid UUID in the incoming `x-trace-id` header is reused, otherwise a
/// fresh one is generated; either way it is echoed on the response. Bodies
/// are never buffered here since uploads can be large.
pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        info!(content_type = %content_type, content_length, "→ request started");

        // A hyphenated UUID is always a valid header value.
        let header_value = HeaderValue::from_str(&trace_id.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
        req.headers_mut().insert(X_TRACE_ID, header_value.clone());

        let mut response = next.run(req).await;
        response.headers_mut().insert(X_TRACE_ID, header_value);

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}
