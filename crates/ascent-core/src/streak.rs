use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::adherence::WINDOW_DAYS;
use crate::practice::{required_practices, PracticeLog};
use crate::types::{PracticeType, Stage};

/// Consecutive fully-adherent days, walking backward from `today`.
///
/// A day counts when the distinct practices completed that day cover the
/// stage's required set. Two asymmetries matter:
///
/// - Today never breaks the streak. An incomplete today is skipped, so a
///   user who has not logged yet still sees yesterday's run.
/// - One earlier incomplete day per walk is forgiven (the grace day). It is
///   skipped without counting; a second gap ends the walk.
///
/// The walk stops after [`WINDOW_DAYS`] days, which caps the result at 14.
pub fn consecutive_days(logs: &[PracticeLog], stage: Stage, today: NaiveDate) -> u32 {
    let required = required_practices(stage);

    let mut done_by_day: HashMap<NaiveDate, HashSet<PracticeType>> = HashMap::new();
    for log in logs.iter().filter(|l| l.completed) {
        done_by_day
            .entry(log.practice_date)
            .or_default()
            .insert(log.practice);
    }
    let day_complete = |day: NaiveDate| {
        done_by_day
            .get(&day)
            .map(|done| required.iter().all(|p| done.contains(p)))
            .unwrap_or(false)
    };

    let mut streak = 0u32;
    let mut grace_used = false;
    for offset in 0..WINDOW_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        let complete = day_complete(day);
        if complete {
            streak += 1;
        } else if offset == 0 {
            // Today is still in progress; skip without judging it.
        } else if !grace_used {
            grace_used = true;
        } else {
            break;
        }
    }
    streak
}
