use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{
    convert_handler, delete_job_handler, download_handler, health_handler, job_status_handler,
};
use super::AppState;

/// Room for multipart boundaries and the option fields on top of the
/// document itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .orchestrator
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/convert", post(convert_handler))
        .route(
            "/api/jobs/:job_id",
            get(job_status_handler).delete(delete_job_handler),
        )
        .route("/api/jobs/:job_id/download", get(download_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
