use crate::cmd::load_engine;
use crate::output::{print_json, print_table};
use ascent_core::store::ProgressStore;
use std::path::Path;
use uuid::Uuid;

pub fn run(data_dir: &Path, user: Uuid, json: bool) -> anyhow::Result<()> {
    let (store, _) = load_engine(data_dir)?;
    let events = store.unlock_events(user)?;

    if json {
        return print_json(&events);
    }

    if events.is_empty() {
        println!("No unlock events.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = events
        .iter()
        .map(|e| {
            vec![
                format!("{} -> {}", e.from_stage, e.to_stage),
                e.unlocked_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                format!("{}%", e.adherence_at_unlock),
                format!("{:+.2}", e.delta_at_unlock),
            ]
        })
        .collect();
    print_table(&["TRANSITION", "UNLOCKED AT", "ADHERENCE", "DELTA"], rows);
    Ok(())
}
