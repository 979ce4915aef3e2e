use crate::config::Config;
use crate::matching::{BatchPolicy, MatchEngine};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Deterministic scorer always; external scorer and advisor only when a key is configured.
    pub engine: MatchEngine,
    pub batch_policy: BatchPolicy,
}

impl AppState {
    pub fn new(config: &Config, engine: MatchEngine) -> Self {
        Self {
            engine,
            batch_policy: config.batch_policy(),
        }
    }
}
