use crate::cmd::load_engine;
use crate::output::print_json;
use ascent_core::assessment::{AssessmentKind, DomainScores};
use ascent_core::types::Domain;
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum AssessSubcommand {
    /// Record the baseline assessment (one per user; re-recording replaces it)
    Baseline {
        user: Uuid,

        #[command(flatten)]
        scores: ScoreArgs,

        /// Assessment date (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record a weekly check-in
    Weekly {
        user: Uuid,

        #[command(flatten)]
        scores: ScoreArgs,

        /// Assessment date (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show per-domain movement between baseline and the latest weekly
    Delta { user: Uuid },
}

/// The four domain scores, each on the 0 to 10 scale.
#[derive(Args)]
pub struct ScoreArgs {
    #[arg(long)]
    regulation: f64,

    #[arg(long)]
    awareness: f64,

    #[arg(long)]
    outlook: f64,

    #[arg(long)]
    attention: f64,
}

impl From<ScoreArgs> for DomainScores {
    fn from(args: ScoreArgs) -> Self {
        DomainScores {
            regulation: args.regulation,
            awareness: args.awareness,
            outlook: args.outlook,
            attention: args.attention,
        }
    }
}

pub fn run(data_dir: &Path, subcmd: AssessSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AssessSubcommand::Baseline { user, scores, date } => {
            record(data_dir, user, AssessmentKind::Baseline, scores.into(), date, json)
        }
        AssessSubcommand::Weekly { user, scores, date } => {
            record(data_dir, user, AssessmentKind::Weekly, scores.into(), date, json)
        }
        AssessSubcommand::Delta { user } => delta(data_dir, user, json),
    }
}

// ---------------------------------------------------------------------------
// record
// ---------------------------------------------------------------------------

fn record(
    data_dir: &Path,
    user: Uuid,
    kind: AssessmentKind,
    scores: DomainScores,
    date: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let now = Utc::now();
    let assessed_on = date.unwrap_or_else(|| now.date_naive());
    let assessment = engine.record_assessment(user, kind, assessed_on, scores, now)?;

    if json {
        return print_json(&assessment);
    }

    println!("Recorded {} assessment on {}.", assessment.kind, assessment.assessed_on);
    for domain in Domain::all() {
        println!("  {:<12} {:.1}", domain.as_str(), assessment.scores.get(*domain));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// delta
// ---------------------------------------------------------------------------

fn delta(data_dir: &Path, user: Uuid, json: bool) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let report = engine.delta_breakdown(user)?;

    if json {
        return print_json(&report);
    }

    let Some(report) = report else {
        println!("No delta yet; record a baseline and a weekly check-in first.");
        return Ok(());
    };

    println!("Baseline: {}   latest weekly: {}", report.baseline_on, report.latest_on);
    for domain in Domain::all() {
        println!("  {:<12} {:+.2}", domain.as_str(), report.per_domain.get(*domain));
    }
    println!("Average delta: {:+.2}", report.average);
    Ok(())
}
