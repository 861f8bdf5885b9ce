//! Application state shared across all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::engine::{InFlight, Orchestrator};

/// Shared application state.
pub struct AppState {
    /// The orchestrator; one action runs at a time.
    pub orchestrator: Mutex<Orchestrator>,
    /// In-flight flags, readable while an action holds the orchestrator.
    pub inflight: InFlight,
}

impl AppState {
    /// Wrap an orchestrator for the router.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Arc<Self> {
        let inflight = orchestrator.inflight();
        Arc::new(Self {
            orchestrator: Mutex::new(orchestrator),
            inflight,
        })
    }
}
