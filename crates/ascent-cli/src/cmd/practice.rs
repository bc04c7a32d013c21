use crate::cmd::load_engine;
use crate::output::{print_json, print_table};
use ascent_core::adherence::window_start;
use ascent_core::engine::LogRequest;
use ascent_core::store::ProgressStore;
use ascent_core::types::PracticeType;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PracticeSubcommand {
    /// Record one practice entry (re-logging the same date replaces it)
    Log {
        user: Uuid,

        /// Practice type: hrvb, awareness_rep, body_scan, focus_sit,
        /// gratitude, reframe, connection
        practice: String,

        /// Practice date (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Record the practice as attempted but not completed
        #[arg(long)]
        incomplete: bool,

        /// Free-form note, at most 5000 characters
        #[arg(long)]
        notes: Option<String>,
    },

    /// List practice entries in a date range (default: the trailing
    /// adherence window)
    List {
        user: Uuid,

        #[arg(long)]
        from: Option<NaiveDate>,

        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

pub fn run(data_dir: &Path, subcmd: PracticeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PracticeSubcommand::Log {
            user,
            practice,
            date,
            incomplete,
            notes,
        } => log(data_dir, user, &practice, date, incomplete, notes, json),
        PracticeSubcommand::List { user, from, to } => list(data_dir, user, from, to, json),
    }
}

// ---------------------------------------------------------------------------
// log
// ---------------------------------------------------------------------------

fn log(
    data_dir: &Path,
    user: Uuid,
    practice: &str,
    date: Option<NaiveDate>,
    incomplete: bool,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let practice: PracticeType = practice.parse()?;
    let now = Utc::now();
    let practice_date = date.unwrap_or_else(|| now.date_naive());

    let request = LogRequest {
        practice,
        practice_date,
        completed: !incomplete,
        notes,
    };
    let summary = engine.log_practice(user, request, now.date_naive(), now)?;

    if json {
        return print_json(&summary);
    }

    let state = if incomplete { "attempted" } else { "completed" };
    println!("Logged {} on {practice_date} ({state}).", practice.label());
    println!(
        "Adherence: {}%   streak: {} days",
        summary.progress.adherence_percentage, summary.progress.consecutive_days
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(
    data_dir: &Path,
    user: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let (store, _) = load_engine(data_dir)?;
    let today = Utc::now().date_naive();
    let from = from.unwrap_or_else(|| window_start(today));
    let to = to.unwrap_or(today);
    let logs = store.practice_logs(user, from, to)?;

    if json {
        return print_json(&logs);
    }

    if logs.is_empty() {
        println!("No practice entries between {from} and {to}.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = logs
        .iter()
        .map(|l| {
            vec![
                l.practice_date.to_string(),
                l.practice.as_str().to_string(),
                if l.completed { "yes" } else { "no" }.to_string(),
                l.notes.as_deref().map(|n| truncate(n, 40)).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["DATE", "PRACTICE", "COMPLETED", "NOTES"], rows);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
