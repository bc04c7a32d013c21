use serde::Serialize;

use crate::criteria::{CriteriaReport, ProgressSnapshot, StageCriteria};
use crate::types::Stage;

// ---------------------------------------------------------------------------
// UnlockState
// ---------------------------------------------------------------------------

/// Why an evaluation landed back in `Locked`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnlockDenial {
    CriteriaNotMet { report: CriteriaReport },
    SubscriptionRequired { target: Stage },
}

/// The states one unlock attempt moves through. Transitions are pure
/// functions of the snapshot; persistence happens elsewhere.
///
/// `PendingReview` is terminal for transitions flagged manual_review: the
/// thresholds passed and eligibility is recorded, but the stage change
/// itself happens out of band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnlockState {
    Locked {
        stage: Stage,
        denial: UnlockDenial,
    },
    Evaluating {
        stage: Stage,
        target: Stage,
    },
    Unlocked {
        from: Stage,
        to: Stage,
        report: CriteriaReport,
    },
    PendingReview {
        stage: Stage,
        target: Stage,
        report: CriteriaReport,
    },
}

/// Entry point of the machine: every attempt starts in `Evaluating`.
pub fn begin(stage: Stage, target: Stage) -> UnlockState {
    UnlockState::Evaluating { stage, target }
}

/// Advances an `Evaluating` state to its terminal state. Criteria are
/// judged first; the subscription gate is applied only once they pass, so
/// a lapsed subscriber with passing numbers sees the payment problem, not
/// a criteria report. Non-`Evaluating` states are already terminal and
/// pass through unchanged.
pub fn decide(
    state: UnlockState,
    criteria: &StageCriteria,
    snapshot: &ProgressSnapshot,
    subscription_ok: bool,
) -> UnlockState {
    let UnlockState::Evaluating { stage, target } = state else {
        return state;
    };

    let report = criteria.check(stage, target, snapshot);
    if !report.passed() {
        return UnlockState::Locked {
            stage,
            denial: UnlockDenial::CriteriaNotMet { report },
        };
    }
    if !subscription_ok {
        return UnlockState::Locked {
            stage,
            denial: UnlockDenial::SubscriptionRequired { target },
        };
    }
    if criteria.manual_review {
        return UnlockState::PendingReview {
            stage,
            target,
            report,
        };
    }
    UnlockState::Unlocked {
        from: stage,
        to: target,
        report,
    }
}
