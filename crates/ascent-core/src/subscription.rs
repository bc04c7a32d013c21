use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Stage, SubscriptionStatus};

/// Billing state as last reported by the payment provider. The engine never
/// talks to the provider; it only reads this mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub status: SubscriptionStatus,
    /// Set when the user canceled but keeps access until the paid period
    /// runs out.
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn new(status: SubscriptionStatus) -> Self {
        Self {
            status,
            cancel_at_period_end: false,
            current_period_end: None,
        }
    }

    /// Active and trialing subscriptions grant access outright. A canceled
    /// subscription still grants access inside the already-paid period when
    /// cancel_at_period_end is set.
    pub fn has_access(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => true,
            SubscriptionStatus::PastDue
            | SubscriptionStatus::Canceled
            | SubscriptionStatus::Unpaid => {
                self.cancel_at_period_end
                    && self
                        .current_period_end
                        .map(|end| now < end)
                        .unwrap_or(false)
            }
        }
    }
}

/// The free tier covers stage 1 only. Everything above requires a
/// subscription that currently grants access.
pub fn stage_permitted(stage: Stage, subscription: Option<&Subscription>, now: DateTime<Utc>) -> bool {
    if stage == Stage::MIN {
        return true;
    }
    subscription.map(|s| s.has_access(now)).unwrap_or(false)
}
