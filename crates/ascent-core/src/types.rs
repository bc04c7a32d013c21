use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AscentError;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// A program stage, 1 through 7. Stage numbers are part of the wire format,
/// so the newtype serializes as a bare integer and rejects anything outside
/// the valid range on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    pub const MIN: Stage = Stage(1);
    pub const MAX: Stage = Stage(7);

    pub fn new(n: u8) -> crate::error::Result<Stage> {
        if (Stage::MIN.0..=Stage::MAX.0).contains(&n) {
            Ok(Stage(n))
        } else {
            Err(AscentError::InvalidStage(n.to_string()))
        }
    }

    pub fn all() -> &'static [Stage] {
        &[
            Stage(1),
            Stage(2),
            Stage(3),
            Stage(4),
            Stage(5),
            Stage(6),
            Stage(7),
        ]
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Option<Stage> {
        if self.0 < Stage::MAX.0 {
            Some(Stage(self.0 + 1))
        } else {
            None
        }
    }

    pub fn is_final(self) -> bool {
        self.0 == Stage::MAX.0
    }
}

impl TryFrom<u8> for Stage {
    type Error = AscentError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Stage::new(n)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Stage {
    type Err = AscentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .parse()
            .map_err(|_| AscentError::InvalidStage(s.to_string()))?;
        Stage::new(n)
    }
}

// ---------------------------------------------------------------------------
// PracticeType
// ---------------------------------------------------------------------------

/// The seven practices of the program, listed in the order stages introduce
/// them. Stage 1 starts with hrvb and awareness_rep; each stage through 6
/// adds the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeType {
    Hrvb,
    AwarenessRep,
    BodyScan,
    FocusSit,
    Gratitude,
    Reframe,
    Connection,
}

impl PracticeType {
    pub fn all() -> &'static [PracticeType] {
        &[
            PracticeType::Hrvb,
            PracticeType::AwarenessRep,
            PracticeType::BodyScan,
            PracticeType::FocusSit,
            PracticeType::Gratitude,
            PracticeType::Reframe,
            PracticeType::Connection,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PracticeType::Hrvb => "hrvb",
            PracticeType::AwarenessRep => "awareness_rep",
            PracticeType::BodyScan => "body_scan",
            PracticeType::FocusSit => "focus_sit",
            PracticeType::Gratitude => "gratitude",
            PracticeType::Reframe => "reframe",
            PracticeType::Connection => "connection",
        }
    }

    /// Human-readable label for CLI and report output.
    pub fn label(self) -> &'static str {
        match self {
            PracticeType::Hrvb => "HRV breathing",
            PracticeType::AwarenessRep => "awareness rep",
            PracticeType::BodyScan => "body scan",
            PracticeType::FocusSit => "focus sit",
            PracticeType::Gratitude => "gratitude",
            PracticeType::Reframe => "reframe",
            PracticeType::Connection => "connection",
        }
    }
}

impl fmt::Display for PracticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PracticeType {
    type Err = AscentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hrvb" => Ok(PracticeType::Hrvb),
            "awareness_rep" | "awareness-rep" => Ok(PracticeType::AwarenessRep),
            "body_scan" | "body-scan" => Ok(PracticeType::BodyScan),
            "focus_sit" | "focus-sit" => Ok(PracticeType::FocusSit),
            "gratitude" => Ok(PracticeType::Gratitude),
            "reframe" => Ok(PracticeType::Reframe),
            "connection" => Ok(PracticeType::Connection),
            _ => Err(AscentError::UnknownPractice(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Assessment domains scored at baseline and in weekly check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Regulation,
    Awareness,
    Outlook,
    Attention,
}

impl Domain {
    pub fn all() -> &'static [Domain] {
        &[
            Domain::Regulation,
            Domain::Awareness,
            Domain::Outlook,
            Domain::Attention,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Regulation => "regulation",
            Domain::Awareness => "awareness",
            Domain::Outlook => "outlook",
            Domain::Attention => "attention",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = AscentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regulation" => Ok(Domain::Regulation),
            "awareness" => Ok(Domain::Awareness),
            "outlook" => Ok(Domain::Outlook),
            "attention" => Ok(Domain::Attention),
            _ => Err(AscentError::UnknownDomain(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SubscriptionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = AscentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "past_due" | "past-due" => Ok(SubscriptionStatus::PastDue),
            "canceled" | "cancelled" => Ok(SubscriptionStatus::Canceled),
            "unpaid" => Ok(SubscriptionStatus::Unpaid),
            _ => Err(AscentError::UnknownSubscriptionStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
