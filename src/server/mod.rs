//! HTTP boundary.
//!
//! A thin axum layer over [`Orchestrator`]: handlers translate multipart
//! forms into [`crate::orchestrator::Upload`]s and [`Doc2DeckError`]s into
//! `{kind, error}` JSON bodies. No state lives here beyond the shared
//! orchestrator handle.
//!
//! [`Doc2DeckError`]: crate::error::Doc2DeckError

mod handlers;
mod router;

pub use handlers::{ErrorBody, JobResponse};
pub use router::create_router;

use crate::orchestrator::Orchestrator;
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    orchestrator: Orchestrator,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(AppState::new(orchestrator)))
        .with_graceful_shutdown(shutdown)
        .await
}
