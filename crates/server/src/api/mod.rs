pub mod download;
pub mod files;
pub mod health;
pub mod schemas;
pub mod search;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use audiofetch_core::SourcePattern;
use audiofetch_extract::MediaExtractor;
use audiofetch_search::SearchProvider;
use audiofetch_store::FileStore;

use crate::metrics::Metrics;
use crate::ratelimit::{RateLimitLayer, RateLimiter};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Audio extraction backend.
    pub extractor: Arc<dyn MediaExtractor>,
    /// Video search backend.
    pub search: Arc<dyn SearchProvider>,
    /// Registry of converted files awaiting their single download.
    pub store: FileStore,
    /// Pattern accepted source URLs must match.
    pub source_pattern: SourcePattern,
    /// Directory converted files are written to.
    pub output_dir: PathBuf,
    /// Maximum search results per query.
    pub search_limit: usize,
    /// Request outcome counters.
    pub metrics: Arc<Metrics>,
}

/// Build the Axum router with all API routes and middleware.
///
/// The CORS layer is added last so it wraps everything else and answers
/// preflights before rate limiting sees them.
pub fn router(state: AppState, limiter: Option<Arc<RateLimiter>>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/download-audio",
            post(download::download_audio).options(preflight),
        )
        .route("/search", post(search::search).options(preflight))
        .route("/files/{token}", get(files::serve_file).options(preflight))
        .with_state(state)
        .layer(RateLimitLayer::new(limiter))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Handler for plain OPTIONS requests that reach past the CORS layer.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::RANGE])
        .expose_headers([header::CONTENT_RANGE, header::CONTENT_LENGTH])
        .max_age(std::time::Duration::from_secs(3600))
}
