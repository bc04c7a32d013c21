use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Stage;

// ---------------------------------------------------------------------------
// StageCriteria
// ---------------------------------------------------------------------------

/// Thresholds a user must clear to move off a stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageCriteria {
    /// Minimum trailing 14-day adherence, percent.
    pub min_adherence: u8,
    /// Minimum whole days spent in the stage.
    pub min_days_in_stage: u32,
    /// Minimum average assessment delta over baseline.
    pub min_average_delta: f64,
    /// When set, meeting the thresholds records eligibility but the
    /// transition itself waits for a coach.
    #[serde(default)]
    pub manual_review: bool,
}

// ---------------------------------------------------------------------------
// CriteriaTable
// ---------------------------------------------------------------------------

/// Per-transition thresholds, indexed by the stage being left. The built-in
/// table tightens as stages climb; config may override individual rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaTable {
    rows: [StageCriteria; 6],
}

impl Default for CriteriaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CriteriaTable {
    pub fn builtin() -> Self {
        let row = |min_adherence, min_days_in_stage, min_average_delta, manual_review| {
            StageCriteria {
                min_adherence,
                min_days_in_stage,
                min_average_delta,
                manual_review,
            }
        };
        CriteriaTable {
            rows: [
                row(70, 14, 0.3, false),
                row(75, 14, 0.3, false),
                row(75, 21, 0.4, false),
                row(80, 21, 0.4, false),
                row(80, 28, 0.5, false),
                row(85, 28, 0.5, true),
            ],
        }
    }

    /// Built-in table with rows replaced by config overrides. Keys are the
    /// stage being left (1 through 6); anything else is ignored here and
    /// flagged by config validation.
    pub fn with_overrides(overrides: &HashMap<u8, StageCriteria>) -> Self {
        let mut table = Self::builtin();
        for (from, criteria) in overrides {
            if (1..=6).contains(from) {
                table.rows[(from - 1) as usize] = *criteria;
            }
        }
        table
    }

    /// Thresholds for leaving `from`. None for the final stage, which has
    /// nowhere to go.
    pub fn for_transition(&self, from: Stage) -> Option<&StageCriteria> {
        if from.is_final() {
            None
        } else {
            Some(&self.rows[(from.number() - 1) as usize])
        }
    }
}

// ---------------------------------------------------------------------------
// Criterion checks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Adherence,
    DaysInStage,
    AverageDelta,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Adherence => "adherence",
            Criterion::DaysInStage => "days_in_stage",
            Criterion::AverageDelta => "average_delta",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured values an unlock attempt is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub adherence_percentage: u8,
    pub days_in_stage: u32,
    /// None until the user has both a baseline and a weekly assessment.
    pub average_delta: Option<f64>,
}

/// One threshold comparison. `actual` is None when the underlying data is
/// missing entirely, which always fails the check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub criterion: Criterion,
    pub required: f64,
    pub actual: Option<f64>,
    pub passed: bool,
    /// How far below the threshold the measurement fell, present only on
    /// failed checks with data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<f64>,
}

impl CriterionCheck {
    fn evaluate(criterion: Criterion, required: f64, actual: Option<f64>) -> Self {
        let passed = actual.map(|a| a >= required).unwrap_or(false);
        let shortfall = match actual {
            Some(a) if !passed => Some(required - a),
            _ => None,
        };
        CriterionCheck {
            criterion,
            required,
            actual,
            passed,
            shortfall,
        }
    }

    /// One-line rendering for CLI output and error messages.
    pub fn describe(&self) -> String {
        match (self.criterion, self.actual) {
            (Criterion::Adherence, Some(a)) => {
                format!("adherence {a:.0}% (requires {:.0}%)", self.required)
            }
            (Criterion::DaysInStage, Some(a)) => {
                format!("days in stage {a:.0} (requires {:.0})", self.required)
            }
            (Criterion::AverageDelta, Some(a)) => {
                format!("average delta {a:.2} (requires {:.2})", self.required)
            }
            (Criterion::AverageDelta, None) => format!(
                "no assessment data recorded (requires delta {:.2})",
                self.required
            ),
            (criterion, None) => format!("no data for {criterion}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CriteriaReport
// ---------------------------------------------------------------------------

/// Full result of judging a snapshot against one transition's thresholds.
/// Callers get every check back, not just a boolean, so clients can tell
/// the user exactly what is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaReport {
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub manual_review: bool,
    pub checks: Vec<CriterionCheck>,
}

impl CriteriaReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CriterionCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn summary(&self) -> String {
        if self.passed() {
            format!("all criteria met for stage {}", self.to_stage)
        } else {
            self.failed()
                .map(|c| c.describe())
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}

impl StageCriteria {
    /// Judges `snapshot` against these thresholds for the `from` -> `to`
    /// transition.
    pub fn check(&self, from: Stage, to: Stage, snapshot: &ProgressSnapshot) -> CriteriaReport {
        let checks = vec![
            CriterionCheck::evaluate(
                Criterion::Adherence,
                self.min_adherence as f64,
                Some(snapshot.adherence_percentage as f64),
            ),
            CriterionCheck::evaluate(
                Criterion::DaysInStage,
                self.min_days_in_stage as f64,
                Some(snapshot.days_in_stage as f64),
            ),
            CriterionCheck::evaluate(
                Criterion::AverageDelta,
                self.min_average_delta,
                snapshot.average_delta,
            ),
        ];
        CriteriaReport {
            from_stage: from,
            to_stage: to,
            manual_review: self.manual_review,
            checks,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(adherence: u8, days: u32, delta: Option<f64>) -> ProgressSnapshot {
        ProgressSnapshot {
            adherence_percentage: adherence,
            days_in_stage: days,
            average_delta: delta,
        }
    }

    fn transition(from: u8) -> (Stage, Stage) {
        let from = Stage::new(from).unwrap();
        (from, from.next().unwrap())
    }

    #[test]
    fn builtin_table_shape() {
        let table = CriteriaTable::builtin();
        let first = table.for_transition(Stage::MIN).unwrap();
        assert_eq!(first.min_adherence, 70);
        assert_eq!(first.min_days_in_stage, 14);
        assert!((first.min_average_delta - 0.3).abs() < f64::EPSILON);
        assert!(!first.manual_review);

        let last = table.for_transition(Stage::new(6).unwrap()).unwrap();
        assert_eq!(last.min_adherence, 85);
        assert_eq!(last.min_days_in_stage, 28);
        assert!(last.manual_review);

        assert!(table.for_transition(Stage::MAX).is_none());
    }

    #[test]
    fn thresholds_never_loosen_as_stages_climb() {
        let table = CriteriaTable::builtin();
        let rows: Vec<_> = Stage::all()
            .iter()
            .filter_map(|s| table.for_transition(*s))
            .collect();
        for pair in rows.windows(2) {
            assert!(pair[1].min_adherence >= pair[0].min_adherence);
            assert!(pair[1].min_days_in_stage >= pair[0].min_days_in_stage);
            assert!(pair[1].min_average_delta >= pair[0].min_average_delta);
        }
    }

    #[test]
    fn all_criteria_met_passes() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(100, 14, Some(0.35)));
        assert!(report.passed());
        assert_eq!(report.failed().count(), 0);
        assert_eq!(report.to_stage, to);
    }

    #[test]
    fn boundary_values_pass() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(70, 14, Some(0.3)));
        assert!(report.passed(), "thresholds are inclusive");
    }

    #[test]
    fn failed_check_reports_shortfall() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(60, 14, Some(0.2)));
        assert!(!report.passed());

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 2);

        let adherence = &failed[0];
        assert_eq!(adherence.criterion, Criterion::Adherence);
        assert_eq!(adherence.shortfall, Some(10.0));

        let delta = &failed[1];
        assert_eq!(delta.criterion, Criterion::AverageDelta);
        assert!((delta.shortfall.unwrap() - 0.1).abs() < 1e-9);
        assert!(delta.describe().contains("0.20"));
    }

    #[test]
    fn missing_delta_fails_without_shortfall() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(100, 30, None));
        assert!(!report.passed());

        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].criterion, Criterion::AverageDelta);
        assert_eq!(failed[0].actual, None);
        assert_eq!(failed[0].shortfall, None);
        assert!(failed[0].describe().contains("no assessment data"));
    }

    #[test]
    fn overrides_replace_single_rows() {
        let mut overrides = HashMap::new();
        overrides.insert(
            1,
            StageCriteria {
                min_adherence: 50,
                min_days_in_stage: 7,
                min_average_delta: 0.1,
                manual_review: false,
            },
        );
        overrides.insert(9, CriteriaTable::builtin().rows[0]);

        let table = CriteriaTable::with_overrides(&overrides);
        assert_eq!(table.for_transition(Stage::MIN).unwrap().min_adherence, 50);
        // Untouched rows keep their built-in values.
        assert_eq!(
            table.for_transition(Stage::new(2).unwrap()),
            CriteriaTable::builtin().for_transition(Stage::new(2).unwrap())
        );
    }

    #[test]
    fn report_serializes_snake_case() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(60, 10, None));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["from_stage"], 1);
        assert_eq!(json["to_stage"], 2);
        assert_eq!(json["checks"][0]["criterion"], "adherence");
        assert_eq!(json["checks"][1]["criterion"], "days_in_stage");
        assert_eq!(json["checks"][2]["criterion"], "average_delta");
        assert!(json["checks"][2]["actual"].is_null());
    }

    #[test]
    fn summary_lists_only_failures() {
        let (from, to) = transition(1);
        let criteria = *CriteriaTable::builtin().for_transition(from).unwrap();
        let report = criteria.check(from, to, &snapshot(60, 20, Some(0.4)));
        let summary = report.summary();
        assert!(summary.contains("adherence 60%"));
        assert!(!summary.contains("days in stage"));
    }
}
