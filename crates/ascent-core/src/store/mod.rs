use chrono::NaiveDate;
use uuid::Uuid;

use crate::assessment::Assessment;
use crate::error::Result;
use crate::practice::PracticeLog;
use crate::progress::{StageUnlockEvent, UserProgress};
use crate::subscription::Subscription;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Data-access seam between the engine and whatever holds the rows. The
/// engine stays pure over this trait, so tests run against [`MemoryStore`]
/// and deployments use [`SqliteStore`] without touching engine code.
///
/// All methods are synchronous; async callers wrap them in a blocking task.
pub trait ProgressStore: Send + Sync {
    // -- sessions -----------------------------------------------------------

    /// Mints an opaque bearer token for `user_id`.
    fn create_session(&self, user_id: Uuid) -> Result<String>;

    /// Resolves a bearer token to the user it was minted for.
    fn resolve_session(&self, token: &str) -> Result<Option<Uuid>>;

    // -- practice logs ------------------------------------------------------

    /// Inserts or replaces the row keyed by (user, practice, practice_date).
    fn upsert_practice_log(&self, log: &PracticeLog) -> Result<()>;

    /// Logs for `user_id` with practice_date in [from, to], ordered by date
    /// then practice.
    fn practice_logs(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<PracticeLog>>;

    // -- progress -----------------------------------------------------------

    fn progress(&self, user_id: Uuid) -> Result<Option<UserProgress>>;

    /// Writes the whole progress row, replacing any existing one. This is
    /// the single mutation point for stage state; callers read, compute,
    /// then write, and the last write wins.
    fn save_progress(&self, progress: &UserProgress) -> Result<()>;

    // -- unlock events ------------------------------------------------------

    fn record_unlock(&self, event: &StageUnlockEvent) -> Result<()>;

    /// All unlock events for `user_id`, oldest first.
    fn unlock_events(&self, user_id: Uuid) -> Result<Vec<StageUnlockEvent>>;

    // -- assessments --------------------------------------------------------

    /// Upserts on (user, kind, assessed_on); resubmitting a day replaces it.
    fn save_assessment(&self, assessment: &Assessment) -> Result<()>;

    /// The user's baseline, most recent if re-baselined.
    fn baseline(&self, user_id: Uuid) -> Result<Option<Assessment>>;

    /// The most recent weekly assessment by assessed_on.
    fn latest_weekly(&self, user_id: Uuid) -> Result<Option<Assessment>>;

    // -- subscriptions ------------------------------------------------------

    fn subscription(&self, user_id: Uuid) -> Result<Option<Subscription>>;

    fn set_subscription(&self, user_id: Uuid, subscription: &Subscription) -> Result<()>;
}
