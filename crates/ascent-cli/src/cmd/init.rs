use anyhow::Context;
use ascent_core::config::{EngineConfig, CONFIG_FILE};
use ascent_core::io;
use ascent_core::store::SqliteStore;
use std::path::Path;

pub fn run(data_dir: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let program_name = match name {
        Some(n) => n.to_string(),
        // The data dir is usually <project>/.ascent, so the parent names
        // the program.
        None => data_dir
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ascent".to_string()),
    };

    println!("Initializing ascent in: {}", data_dir.display());

    io::ensure_dir(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = data_dir.join(CONFIG_FILE);
    let default_config = serde_yaml::to_string(&EngineConfig::new(&program_name))
        .context("failed to render default config")?;
    let created = io::write_if_missing(&config_path, default_config.as_bytes())
        .context("failed to write config.yaml")?;
    if created {
        println!("  created: {CONFIG_FILE}");
    } else {
        println!("  exists:  {CONFIG_FILE}");
    }

    // Opening the store bootstraps the schema.
    let config = EngineConfig::load(data_dir).context("failed to load config")?;
    let db_path = config.database_path(data_dir);
    let db_existed = db_path.exists();
    SqliteStore::open(&db_path).context("failed to open database")?;
    if db_existed {
        println!("  exists:  {}", config.database);
    } else {
        println!("  created: {}", config.database);
    }

    println!("\nAscent initialized.");
    println!("Next: ascent enroll");
    Ok(())
}
