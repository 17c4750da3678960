//! Shared application state for the API server.

use std::sync::Arc;

use tally_engine::LedgerEngine;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Handlers
/// reach the engine through it; the auth middleware reads the pre-shared
/// API key from it.
#[derive(Clone)]
pub struct AppState {
    /// The ledger engine serving every read and mutation.
    pub engine: Arc<LedgerEngine>,
    /// The pre-shared key every request must present.
    pub api_key: String,
}

impl AppState {
    /// Create application state around an engine.
    pub fn new(engine: Arc<LedgerEngine>, api_key: impl Into<String>) -> Self {
        Self {
            engine,
            api_key: api_key.into(),
        }
    }
}
