use crate::output::{print_json, print_table};
use anyhow::Context;
use ascent_core::config::EngineConfig;
use ascent_core::types::Stage;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Show the config and the effective unlock thresholds
    Show,
}

pub fn run(data_dir: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(data_dir, json),
        ConfigSubcommand::Show => show(data_dir, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    use ascent_core::config::WarnLevel;

    let config = EngineConfig::load(data_dir).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let config = EngineConfig::load(data_dir).context("failed to load config")?;
    let table = config.criteria_table();

    let mut effective = Vec::new();
    for from in 1..=6u8 {
        let stage = Stage::new(from)?;
        if let Some(row) = table.for_transition(stage) {
            effective.push((from, *row));
        }
    }

    if json {
        let criteria: Vec<serde_json::Value> = effective
            .iter()
            .map(|(from, row)| {
                serde_json::json!({
                    "from_stage": from,
                    "to_stage": from + 1,
                    "min_adherence": row.min_adherence,
                    "min_days_in_stage": row.min_days_in_stage,
                    "min_average_delta": row.min_average_delta,
                    "manual_review": row.manual_review,
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "config": config,
            "effective_criteria": criteria,
        }));
    }

    println!("Program:  {}", config.program.name);
    println!("Database: {}", config.database);
    println!("Server:   {}:{}", config.server.bind, config.server.port);
    println!(
        "Unlock attempts per user per hour: {}",
        config.rate_limit.unlock_per_hour
    );

    println!("\nEffective unlock thresholds:");
    let rows: Vec<Vec<String>> = effective
        .iter()
        .map(|(from, row)| {
            vec![
                format!("{} -> {}", from, from + 1),
                format!("{}%", row.min_adherence),
                row.min_days_in_stage.to_string(),
                format!("{:.2}", row.min_average_delta),
                if row.manual_review { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["TRANSITION", "ADHERENCE", "DAYS", "DELTA", "REVIEW"], rows);
    Ok(())
}
