//! Startup helpers for the PaletteFlow server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::engine::Orchestrator;
use crate::server::{self, AppState};
use crate::service::http::HttpPaletteService;
use crate::session::config::PaletteConfig;
use crate::store::records::SqliteRecordStore;

/// Run the server (used by the `paletteflow-server` binary).
///
/// An optional first argument names the session to open, as a `/feature/{id}`
/// route would.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting PaletteFlow v{}", env!("CARGO_PKG_VERSION"));

    let config = match PaletteConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    let route_id = std::env::args().nth(1);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run_until_ctrl_c(config, route_id)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Open the stores, probe the backend and restore the last session.
///
/// # Errors
/// Returns an error if the backend URL is invalid or the database cannot be opened.
pub async fn initialize(
    config: &PaletteConfig,
    route_id: Option<&str>,
) -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let service = HttpPaletteService::new(&config.service)
        .map_err(|e| format!("Failed to create palette service client: {e}"))?;
    tracing::info!("Palette service endpoint: {}", service.base_url());

    let records = SqliteRecordStore::new(&config.storage)
        .await
        .map_err(|e| format!("Failed to open {}: {e}", config.storage.sqlite_path.display()))?;

    let mut orchestrator = Orchestrator::new(Arc::new(service), Arc::new(records), config);
    match orchestrator.bootstrap(route_id).await {
        Some(id) => tracing::info!("Restored session {id}"),
        None => tracing::info!("Started a fresh conversation"),
    }

    Ok(AppState::new(orchestrator))
}

async fn run_until_ctrl_c(
    config: PaletteConfig,
    route_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = initialize(&config, route_id.as_deref()).await?;
    server::serve(state, config.server.port, ctrl_c()).await
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::GREETING;

    #[tokio::test]
    async fn test_initialize_with_unreachable_backend_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PaletteConfig::default();
        config.storage.sqlite_path = dir.path().join("palettes.sqlite");
        config.service.base_url = "http://127.0.0.1:9".to_string();
        config.service.connect_timeout_secs = 1;
        config.service.timeout_secs = 1;

        let state = initialize(&config, None).await.unwrap();
        let orchestrator = state.orchestrator.lock().await;
        assert!(orchestrator.state().session_id.is_none());
        assert_eq!(
            orchestrator.transcript()[0].content.as_deref(),
            Some(GREETING)
        );
        assert!(!orchestrator.notices().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_url() {
        let mut config = PaletteConfig::default();
        config.service.base_url = "not a url".to_string();
        assert!(initialize(&config, None).await.is_err());
    }
}
