use crate::cmd::load_engine;
use crate::output::print_json;
use ascent_core::store::ProgressStore;
use ascent_core::subscription::Subscription;
use ascent_core::types::SubscriptionStatus;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum SubscriptionSubcommand {
    /// Create or replace a user's subscription record. Stands in for the
    /// billing provider's webhook.
    Set {
        user: Uuid,

        /// Status: active, trialing, past_due, canceled, unpaid
        status: String,

        /// Keep access until the period ends after cancellation
        #[arg(long)]
        cancel_at_period_end: bool,

        /// End of the current billing period (RFC 3339)
        #[arg(long)]
        period_end: Option<DateTime<Utc>>,
    },

    /// Show a user's subscription record
    Show { user: Uuid },
}

pub fn run(data_dir: &Path, subcmd: SubscriptionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SubscriptionSubcommand::Set {
            user,
            status,
            cancel_at_period_end,
            period_end,
        } => set(data_dir, user, &status, cancel_at_period_end, period_end, json),
        SubscriptionSubcommand::Show { user } => show(data_dir, user, json),
    }
}

fn set(
    data_dir: &Path,
    user: Uuid,
    status: &str,
    cancel_at_period_end: bool,
    period_end: Option<DateTime<Utc>>,
    json: bool,
) -> anyhow::Result<()> {
    let (store, _) = load_engine(data_dir)?;
    let status: SubscriptionStatus = status.parse()?;
    let subscription = Subscription {
        status,
        cancel_at_period_end,
        current_period_end: period_end,
    };
    store.set_subscription(user, &subscription)?;

    if json {
        return print_json(&subscription);
    }

    println!("Subscription for {user}: {status}");
    if let Some(end) = subscription.current_period_end {
        println!("Period ends: {end}");
    }
    if subscription.cancel_at_period_end {
        println!("Cancels at period end; access continues until then.");
    }
    Ok(())
}

fn show(data_dir: &Path, user: Uuid, json: bool) -> anyhow::Result<()> {
    let (store, _) = load_engine(data_dir)?;
    let subscription = store.subscription(user)?;

    if json {
        return print_json(&subscription);
    }

    match subscription {
        Some(s) => {
            println!("Status: {}", s.status);
            println!(
                "Access: {}",
                if s.has_access(Utc::now()) {
                    "granted"
                } else {
                    "denied"
                }
            );
            if let Some(end) = s.current_period_end {
                println!("Period ends: {end}");
            }
            if s.cancel_at_period_end {
                println!("Cancels at period end.");
            }
        }
        None => println!("No subscription on file."),
    }
    Ok(())
}
