use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AscentError, Result};
use crate::types::{PracticeType, Stage};

/// Upper bound on free-text notes attached to a log entry.
pub const NOTES_MAX_CHARS: usize = 5000;

/// How far back a client may back-date a log entry, in days.
pub const BACKDATE_LIMIT_DAYS: i64 = 31;

/// One practice log row. A user has at most one row per practice per
/// calendar day; re-logging replaces the row rather than appending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeLog {
    pub user_id: Uuid,
    pub practice: PracticeType,
    /// Calendar day the practice belongs to, as reported by the client.
    pub practice_date: NaiveDate,
    /// Stage the user was in when the entry was recorded.
    pub stage: Stage,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PracticeLog {
    pub fn new(
        user_id: Uuid,
        practice: PracticeType,
        practice_date: NaiveDate,
        stage: Stage,
    ) -> Self {
        Self {
            user_id,
            practice,
            practice_date,
            stage,
            completed: false,
            completed_at: None,
            notes: None,
        }
    }

    pub fn complete(mut self, at: DateTime<Utc>) -> Self {
        self.completed = true;
        self.completed_at = Some(at);
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Checks the fields a client controls. `today` anchors the date window:
    /// entries may be back-dated up to [`BACKDATE_LIMIT_DAYS`] and
    /// forward-dated by at most one day to absorb timezone skew.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(notes) = &self.notes {
            let len = notes.chars().count();
            if len > NOTES_MAX_CHARS {
                return Err(AscentError::Validation(format!(
                    "notes too long: {len} chars (limit {NOTES_MAX_CHARS})"
                )));
            }
        }
        let age = (today - self.practice_date).num_days();
        if age > BACKDATE_LIMIT_DAYS {
            return Err(AscentError::Validation(format!(
                "practice_date {} is more than {BACKDATE_LIMIT_DAYS} days in the past",
                self.practice_date
            )));
        }
        if age < -1 {
            return Err(AscentError::Validation(format!(
                "practice_date {} is in the future",
                self.practice_date
            )));
        }
        Ok(())
    }
}

/// The practices a given stage requires daily. Sets are cumulative: stage 1
/// starts with hrvb and awareness_rep, stages 2 through 6 each add one more,
/// and stages 6 and 7 both require all seven.
pub fn required_practices(stage: Stage) -> &'static [PracticeType] {
    let all = PracticeType::all();
    let count = (stage.number() as usize + 1).min(all.len());
    &all[..count]
}
