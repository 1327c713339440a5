pub mod anthropic;
pub mod captioner;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod language;
pub mod models;
pub mod prompt;
pub mod rate_limit;
pub mod state;
pub mod vibe;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;

use models::{AnalyzeResponse, ErrorBody, HealthResponse};
use state::AppState;

/// Ceiling for the whole multipart body; the photo itself is capped lower.
pub const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PostPerfect API",
        description = "AI-powered Instagram caption generator"
    ),
    paths(handlers::analyze_handler, handlers::health_handler),
    components(schemas(AnalyzeResponse, ErrorBody, HealthResponse)),
    tags(
        (name = "analyze", description = "Photo analysis and caption generation"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router. Kept out of `main` so tests can drive it
/// without binding a port.
pub fn create_router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let analyze = Router::new()
        .route("/api/analyze", post(handlers::analyze_handler))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit::limit_requests,
        ));

    let mut router = Router::new()
        .route("/api/health", get(handlers::health_handler))
        .merge(analyze);

    if state.openapi_enabled {
        router = router.route("/openapi.json", get(openapi_handler));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
