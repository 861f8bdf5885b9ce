//! HTTP surface of the palette engine.
//!
//! [`app`] wraps the API routes with permissive CORS (the page is usually
//! served from another origin) and request tracing. [`serve`] binds the
//! listener and, once the shutdown signal fires, flushes the active session
//! so an interrupted conversation is still restorable on the next start.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// API router with the CORS and tracing layers applied.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the palette API on `port` until `shutdown_signal` completes, then
/// flush the session, history and transcript.
///
/// The flush also runs when the server fails after binding.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("PaletteFlow listening on http://{addr}");

    let served = axum::serve(listener, app(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal)
        .await;

    state.orchestrator.lock().await.flush().await;
    tracing::info!("Session flushed, server stopped");
    served.map_err(Into::into)
}
