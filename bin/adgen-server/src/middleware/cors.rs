use crate::config::Config;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

pub fn cors_layer(config: &Config) -> CorsLayer {
    let permissive = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let Some(origins_str) = &config.cors_allowed_origins else {
        // Wildcard, suitable for development; set ADGEN_CORS_ORIGINS in production.
        return permissive;
    };

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        return permissive;
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers(Any)
        .allow_methods(Any)
}
