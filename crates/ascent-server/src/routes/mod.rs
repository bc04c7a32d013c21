pub mod assessments;
pub mod health;
pub mod practices;
pub mod progress;

use ascent_core::engine::ProgressSummary;

/// Response shape shared by every endpoint that returns the user's
/// progress.
pub(crate) fn summary_json(summary: &ProgressSummary) -> serde_json::Value {
    serde_json::json!({
        "user_id": summary.progress.user_id,
        "current_stage": summary.progress.current_stage,
        "adherence_percentage": summary.progress.adherence_percentage,
        "consecutive_days": summary.progress.consecutive_days,
        "stage_start_date": summary.progress.stage_start_date,
        "days_in_stage": summary.days_in_stage,
        "unlock_eligible": summary.progress.unlock_eligible,
        "has_active_subscription": summary.progress.has_active_subscription,
        "average_delta": summary.average_delta,
        "next_stage": summary.next_stage,
        "criteria": summary.criteria,
    })
}
