//! Axum router construction.
//!
//! [`build`] assembles the application router:
//! - `POST /generate` and its `/api/generate` alias
//! - `GET /health`
//! - `/static`, serving stored images from the output directory
//! - optional Swagger UI (disable with `ADGEN_ENABLE_SWAGGER=false`)

pub mod doc;
mod generate;
mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(generate::router())
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes()));

    let mut app = Router::new()
        .merge(api_router)
        .nest_service("/static", ServeDir::new(&state.config.output_dir));

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
