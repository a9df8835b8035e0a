//! HTTP surface for the relay
//!
//! Exposes three endpoints:
//! - GET /        - Service banner (doubles as the hosting health check)
//! - GET /health  - Health check
//! - POST /process - Image upload + mode, relayed to Gemini

mod handlers;

use crate::ai::{GeminiVisionClient, VisionService};
use crate::models::Config;
use crate::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared per-process state: one stateless Gemini handle reused by every
/// request.
#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<dyn VisionService>,
}

/// Max request body size. Phone photos of study notes routinely exceed
/// axum's 2 MB default; Gemini accepts roughly 20 MB of inline data, so cap
/// uploads just above that and let the upstream reject anything larger.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The frontend is served from a different origin (GitHub Pages) and sends
    // credentials, so mirror the request origin rather than using a wildcard.
    let cors = CorsLayer::very_permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/process", post(handlers::process))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until the process is stopped.
pub async fn run(config: Config) -> Result<()> {
    let vision = GeminiVisionClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    );
    info!("Gemini model: {}", vision.model());

    let state = AppState {
        vision: Arc::new(vision),
    };

    let app = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
