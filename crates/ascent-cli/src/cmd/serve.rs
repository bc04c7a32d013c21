use anyhow::Context;
use ascent_core::config::EngineConfig;
use ascent_core::store::SqliteStore;
use ascent_server::state::AppState;
use std::path::Path;
use std::sync::Arc;

pub fn run(data_dir: &Path, bind: Option<&str>, port: Option<u16>) -> anyhow::Result<()> {
    let config = EngineConfig::load(data_dir).context("failed to load config")?;
    let store = Arc::new(
        SqliteStore::open(config.database_path(data_dir)).context("failed to open database")?,
    );
    let state = AppState::new(store, &config);

    let bind = bind.unwrap_or(config.server.bind.as_str()).to_string();
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
            .await
            .with_context(|| format!("failed to bind {bind}:{port}"))?;

        tokio::select! {
            res = ascent_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
