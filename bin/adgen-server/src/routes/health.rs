//! Liveness endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness probe.
///
/// Always answers 200 while the process is serving; it does not touch the
/// generation capability.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status":  "ok",
        "service": "adgen",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok_and_service() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "adgen");
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
    }
}
