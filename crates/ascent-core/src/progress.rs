use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Stage;

// ---------------------------------------------------------------------------
// UserProgress
// ---------------------------------------------------------------------------

/// One row per enrolled user: the current stage plus derived fields that are
/// refreshed on every log entry and every unlock attempt. The derived fields
/// exist so reads are cheap; the log table stays the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: Uuid,
    pub current_stage: Stage,
    /// Trailing 14-day adherence, 0..=100.
    pub adherence_percentage: u8,
    /// Fully-adherent day streak, capped at the adherence window length.
    pub consecutive_days: u32,
    /// Day the user entered the current stage.
    pub stage_start_date: NaiveDate,
    /// Whether the thresholds for the next stage were met at last refresh.
    pub unlock_eligible: bool,
    /// Subscription gate result at last refresh.
    pub has_active_subscription: bool,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    /// Fresh enrollment: everyone starts at stage 1 with empty counters.
    pub fn enroll(user_id: Uuid, start: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            current_stage: Stage::MIN,
            adherence_percentage: 0,
            consecutive_days: 0,
            stage_start_date: start,
            unlock_eligible: false,
            has_active_subscription: false,
            updated_at: now,
        }
    }

    /// Whole days spent in the current stage as of `today`, never negative.
    pub fn days_in_stage(&self, today: NaiveDate) -> u32 {
        let days = (today - self.stage_start_date).num_days();
        u32::try_from(days).unwrap_or(0)
    }

    /// Moves the user to `to` and resets the per-stage clock. Eligibility is
    /// cleared; the next refresh recomputes it against the new stage.
    pub fn advance_to(&mut self, to: Stage, today: NaiveDate, now: DateTime<Utc>) {
        self.current_stage = to;
        self.stage_start_date = today;
        self.unlock_eligible = false;
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// StageUnlockEvent
// ---------------------------------------------------------------------------

/// Append-only record of a successful stage transition, kept for coach
/// review and support escalations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUnlockEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub unlocked_at: DateTime<Utc>,
    /// Adherence at the moment of unlock, measured against the old stage.
    pub adherence_at_unlock: u8,
    pub delta_at_unlock: f64,
}

impl StageUnlockEvent {
    pub fn record(
        user_id: Uuid,
        from_stage: Stage,
        to_stage: Stage,
        unlocked_at: DateTime<Utc>,
        adherence_at_unlock: u8,
        delta_at_unlock: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            from_stage,
            to_stage,
            unlocked_at,
            adherence_at_unlock,
            delta_at_unlock,
        }
    }
}
