use std::sync::Arc;

use ascent_core::config::EngineConfig;
use ascent_core::engine::UnlockEngine;
use ascent_core::store::ProgressStore;

use crate::limit::{self, UnlockLimiter};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProgressStore>,
    pub engine: Arc<UnlockEngine>,
    pub unlock_limiter: Arc<UnlockLimiter>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProgressStore>, config: &EngineConfig) -> Self {
        let engine = Arc::new(UnlockEngine::new(store.clone(), config.criteria_table()));
        let unlock_limiter = limit::unlock_limiter(config.rate_limit.unlock_per_hour);
        Self {
            store,
            engine,
            unlock_limiter,
        }
    }
}
