use chrono::{Days, NaiveDate};

use crate::practice::{required_practices, PracticeLog};
use crate::types::Stage;

/// Trailing window length, in days, shared by the adherence percentage and
/// the streak cap.
pub const WINDOW_DAYS: u64 = 14;

/// Start of the trailing window ending at `today`, inclusive on both ends.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(WINDOW_DAYS - 1)).unwrap_or(today)
}

/// Trailing 14-day completion percentage against the stage's required set.
///
/// Counts every completed row dated inside [today-13, today] and divides by
/// required_count * 14, rounding to the nearest whole percent. The count is
/// not deduplicated against the required set, so stray completions from
/// practices above the user's stage over-credit slightly; the clamp keeps
/// the result inside 0..=100 either way.
pub fn adherence_percentage(logs: &[PracticeLog], stage: Stage, today: NaiveDate) -> u8 {
    let required = required_practices(stage).len();
    if required == 0 {
        return 0;
    }
    let start = window_start(today);
    let completed = logs
        .iter()
        .filter(|log| log.completed && log.practice_date >= start && log.practice_date <= today)
        .count();
    let expected = (required as u64 * WINDOW_DAYS) as f64;
    let pct = (100.0 * completed as f64 / expected).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PracticeType;
    use chrono::Utc;
    use uuid::Uuid;

    fn completed_log(
        user_id: Uuid,
        practice: PracticeType,
        date: NaiveDate,
        stage: Stage,
    ) -> PracticeLog {
        PracticeLog::new(user_id, practice, date, stage).complete(Utc::now())
    }

    fn day(offset: u64, today: NaiveDate) -> NaiveDate {
        today.checked_sub_days(Days::new(offset)).unwrap()
    }

    #[test]
    fn zero_logs_is_zero_percent() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(adherence_percentage(&[], Stage::MIN, today), 0);
    }

    #[test]
    fn full_window_is_one_hundred_percent() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let mut logs = Vec::new();
        for offset in 0..WINDOW_DAYS {
            for practice in required_practices(Stage::MIN) {
                logs.push(completed_log(user, *practice, day(offset, today), Stage::MIN));
            }
        }
        assert_eq!(adherence_percentage(&logs, Stage::MIN, today), 100);
    }

    #[test]
    fn half_window_rounds_to_fifty() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let mut logs = Vec::new();
        for offset in 0..(WINDOW_DAYS / 2) {
            for practice in required_practices(Stage::MIN) {
                logs.push(completed_log(user, *practice, day(offset, today), Stage::MIN));
            }
        }
        assert_eq!(adherence_percentage(&logs, Stage::MIN, today), 50);
    }

    #[test]
    fn incomplete_rows_do_not_count() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let logs = vec![
            PracticeLog::new(user, PracticeType::Hrvb, today, Stage::MIN),
            completed_log(user, PracticeType::AwarenessRep, today, Stage::MIN),
        ];
        // 1 completed out of 28 expected -> 3.57 -> rounds to 4.
        assert_eq!(adherence_percentage(&logs, Stage::MIN, today), 4);
    }

    #[test]
    fn logs_outside_window_ignored() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let logs = vec![
            completed_log(user, PracticeType::Hrvb, day(WINDOW_DAYS, today), Stage::MIN),
            completed_log(
                user,
                PracticeType::Hrvb,
                today.checked_add_days(Days::new(1)).unwrap(),
                Stage::MIN,
            ),
        ];
        assert_eq!(adherence_percentage(&logs, Stage::MIN, today), 0);
    }

    #[test]
    fn overflow_clamps_to_one_hundred() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let mut logs = Vec::new();
        // Every practice every day, while stage 1 only requires two.
        for offset in 0..WINDOW_DAYS {
            for practice in PracticeType::all() {
                logs.push(completed_log(user, *practice, day(offset, today), Stage::MIN));
            }
        }
        assert_eq!(adherence_percentage(&logs, Stage::MIN, today), 100);
    }

    #[test]
    fn higher_stage_needs_more_rows_for_same_percentage() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let user = Uuid::new_v4();
        let stage3 = Stage::new(3).unwrap();
        let mut logs = Vec::new();
        for offset in 0..WINDOW_DAYS {
            for practice in required_practices(Stage::MIN) {
                logs.push(completed_log(user, *practice, day(offset, today), stage3));
            }
        }
        // 28 completions against 4 * 14 = 56 expected.
        assert_eq!(adherence_percentage(&logs, stage3, today), 50);
    }
}
