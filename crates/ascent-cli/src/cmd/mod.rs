pub mod assess;
pub mod config;
pub mod enroll;
pub mod events;
pub mod init;
pub mod practice;
pub mod progress;
pub mod serve;
pub mod session;
pub mod subscription;
pub mod unlock;

use anyhow::Context;
use ascent_core::config::EngineConfig;
use ascent_core::engine::UnlockEngine;
use ascent_core::store::SqliteStore;
use std::path::Path;
use std::sync::Arc;

/// Open the configured store and build an engine over it. Every command
/// except `init` and `serve` goes through here.
pub fn load_engine(data_dir: &Path) -> anyhow::Result<(Arc<SqliteStore>, UnlockEngine)> {
    let config = EngineConfig::load(data_dir)
        .with_context(|| format!("no config in {}", data_dir.display()))?;
    let store = Arc::new(
        SqliteStore::open(config.database_path(data_dir)).context("failed to open database")?,
    );
    let engine = UnlockEngine::new(store.clone(), config.criteria_table());
    Ok((store, engine))
}
