use crate::cmd::load_engine;
use crate::output::print_json;
use ascent_core::store::ProgressStore;
use clap::Subcommand;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Issue a bearer token for the HTTP API
    Issue { user: Uuid },
}

pub fn run(data_dir: &Path, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SessionSubcommand::Issue { user } => issue(data_dir, user, json),
    }
}

fn issue(data_dir: &Path, user: Uuid, json: bool) -> anyhow::Result<()> {
    let (store, _) = load_engine(data_dir)?;
    let token = store.create_session(user)?;

    if json {
        return print_json(&serde_json::json!({ "user_id": user, "token": token }));
    }

    // Bare token on stdout so scripts can capture it.
    println!("{token}");
    Ok(())
}
