use std::sync::Arc;

use crate::config::StreamConfig;
use crate::core::agent::AgentEngine;

/// Shared application state for the HTTP server.
///
/// Nothing here is mutable; every request works on its own copy of the model
/// pool, so the engine is shared behind a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AgentEngine>,
    /// Pauses between staged events.
    pub pacing: StreamConfig,
}

impl AppState {
    pub fn new(engine: AgentEngine, pacing: StreamConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            pacing,
        }
    }
}
