use crate::cmd::load_engine;
use crate::output::{print_json, print_table};
use ascent_core::criteria::Criterion;
use ascent_core::practice::required_practices;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub fn run(data_dir: &Path, user: Uuid, json: bool) -> anyhow::Result<()> {
    let (_, engine) = load_engine(data_dir)?;
    let now = Utc::now();
    let summary = engine.summary(user, now.date_naive(), now)?;

    if json {
        return print_json(&summary);
    }

    let progress = &summary.progress;
    println!("User:          {}", progress.user_id);
    println!(
        "Stage:         {} (since {}, {} days)",
        progress.current_stage, progress.stage_start_date, summary.days_in_stage
    );
    println!("Adherence:     {}%", progress.adherence_percentage);
    println!("Streak:        {} days", progress.consecutive_days);
    match summary.average_delta {
        Some(delta) => println!("Average delta: {delta:+.2}"),
        None => println!("Average delta: (no assessment data)"),
    }
    println!(
        "Subscription:  {}",
        if progress.has_active_subscription {
            "active"
        } else {
            "none"
        }
    );

    let required: Vec<&str> = required_practices(progress.current_stage)
        .iter()
        .map(|p| p.label())
        .collect();
    println!("Required:      {}", required.join(", "));

    match (summary.next_stage, &summary.criteria) {
        (Some(next), Some(report)) => {
            println!("\nUnlock criteria for stage {next}:");
            let rows: Vec<Vec<String>> = report
                .checks
                .iter()
                .map(|c| {
                    vec![
                        c.criterion.as_str().to_string(),
                        format_value(c.criterion, c.required),
                        c.actual
                            .map(|a| format_value(c.criterion, a))
                            .unwrap_or_else(|| "-".to_string()),
                        if c.passed { "pass" } else { "fail" }.to_string(),
                    ]
                })
                .collect();
            print_table(&["CRITERION", "REQUIRED", "ACTUAL", "STATUS"], rows);
            if report.manual_review {
                println!("\nThis transition also requires a coach review.");
            }
            if report.passed() {
                println!("\nEligible. Run: ascent unlock {} {next}", progress.user_id);
            }
        }
        _ => println!("\nFinal stage reached; nothing left to unlock."),
    }
    Ok(())
}

fn format_value(criterion: Criterion, value: f64) -> String {
    match criterion {
        Criterion::Adherence => format!("{value:.0}%"),
        Criterion::DaysInStage => format!("{value:.0}"),
        Criterion::AverageDelta => format!("{value:.2}"),
    }
}
