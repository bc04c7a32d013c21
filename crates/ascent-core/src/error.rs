use thiserror::Error;

use crate::criteria::CriteriaReport;
use crate::types::Stage;

#[derive(Debug, Error)]
pub enum AscentError {
    #[error("not initialized: run 'ascent init'")]
    NotInitialized,

    #[error("invalid stage '{0}': unlock targets run 2 through 7")]
    InvalidStage(String),

    #[error("no progress record for user {0}: enroll the user first")]
    NoProgress(uuid::Uuid),

    #[error("user already enrolled: {0}")]
    AlreadyEnrolled(uuid::Uuid),

    #[error("stage skip attempt: current stage is {current}, requested {requested}")]
    StageSkip { current: Stage, requested: Stage },

    #[error("an active subscription is required to unlock stage {target}")]
    SubscriptionRequired { target: Stage },

    #[error("unlock criteria not met for stage {}: {}", .report.to_stage, .report.summary())]
    CriteriaNotMet { report: CriteriaReport },

    #[error("unknown practice type: {0}")]
    UnknownPractice(String),

    #[error("unknown assessment domain: {0}")]
    UnknownDomain(String),

    #[error("unknown subscription status: {0}")]
    UnknownSubscriptionStatus(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, AscentError>;
