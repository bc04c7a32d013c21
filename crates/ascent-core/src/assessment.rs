use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AscentError, Result};
use crate::types::Domain;

/// Scores run 0.0 through 10.0 in every domain.
pub const SCORE_MAX: f64 = 10.0;

// ---------------------------------------------------------------------------
// DomainScores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub regulation: f64,
    pub awareness: f64,
    pub outlook: f64,
    pub attention: f64,
}

impl DomainScores {
    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Regulation => self.regulation,
            Domain::Awareness => self.awareness,
            Domain::Outlook => self.outlook,
            Domain::Attention => self.attention,
        }
    }

    pub fn mean(&self) -> f64 {
        let sum: f64 = Domain::all().iter().map(|d| self.get(*d)).sum();
        sum / Domain::all().len() as f64
    }

    /// Per-domain difference of `self` relative to `baseline`.
    pub fn delta_from(&self, baseline: &DomainScores) -> DomainScores {
        DomainScores {
            regulation: self.regulation - baseline.regulation,
            awareness: self.awareness - baseline.awareness,
            outlook: self.outlook - baseline.outlook,
            attention: self.attention - baseline.attention,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for domain in Domain::all() {
            let score = self.get(*domain);
            if !score.is_finite() || !(0.0..=SCORE_MAX).contains(&score) {
                return Err(AscentError::Validation(format!(
                    "{domain} score {score} outside 0..={SCORE_MAX}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Baseline,
    Weekly,
}

impl AssessmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentKind::Baseline => "baseline",
            AssessmentKind::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentKind {
    type Err = AscentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(AssessmentKind::Baseline),
            "weekly" => Ok(AssessmentKind::Weekly),
            _ => Err(AscentError::Validation(format!(
                "unknown assessment kind: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub user_id: Uuid,
    pub kind: AssessmentKind,
    /// Calendar day the assessment covers.
    pub assessed_on: NaiveDate,
    pub scores: DomainScores,
    pub recorded_at: DateTime<Utc>,
}

impl Assessment {
    pub fn new(
        user_id: Uuid,
        kind: AssessmentKind,
        assessed_on: NaiveDate,
        scores: DomainScores,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            assessed_on,
            scores,
            recorded_at,
        }
    }
}

/// Mean improvement of the latest weekly assessment over the baseline,
/// averaged across the four domains. This is the number the unlock
/// criteria compare against a minimum delta.
pub fn average_delta(baseline: &DomainScores, latest: &DomainScores) -> f64 {
    latest.delta_from(baseline).mean()
}
