use crate::cmd::load_engine;
use crate::output::print_json;
use ascent_core::engine::UnlockOutcome;
use ascent_core::error::AscentError;
use ascent_core::types::Stage;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub fn run(data_dir: &Path, user: Uuid, target: u8, json: bool) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let target = Stage::new(target)?;
    let now = Utc::now();

    match engine.attempt_unlock(user, target, now.date_naive(), now) {
        Ok(outcome) => {
            if json {
                return print_json(&outcome);
            }
            match outcome {
                UnlockOutcome::Unlocked {
                    progress, event, ..
                } => {
                    println!("Unlocked stage {} (from {}).", event.to_stage, event.from_stage);
                    println!("Adherence at unlock: {}%", event.adherence_at_unlock);
                    println!("Stage clock restarted on {}.", progress.stage_start_date);
                }
                UnlockOutcome::PendingReview { stage, target, .. } => {
                    println!(
                        "Criteria met for stage {target}; the move from stage {stage} \
                         awaits a coach review."
                    );
                }
            }
            Ok(())
        }
        // Denial with a report: show each failed criterion, then fail.
        Err(AscentError::CriteriaNotMet { report }) => {
            if json {
                print_json(&report)?;
            } else {
                println!("Not eligible for stage {} yet:", report.to_stage);
                for check in report.failed() {
                    println!("  - {}", check.describe());
                }
            }
            anyhow::bail!("unlock criteria not met")
        }
        Err(e) => Err(e.into()),
    }
}
