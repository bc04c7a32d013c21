use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::assessment::{Assessment, AssessmentKind};
use crate::error::Result;
use crate::practice::PracticeLog;
use crate::progress::{StageUnlockEvent, UserProgress};
use crate::store::ProgressStore;
use crate::subscription::Subscription;
use crate::types::PracticeType;

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Uuid>,
    logs: HashMap<(Uuid, PracticeType, NaiveDate), PracticeLog>,
    progress: HashMap<Uuid, UserProgress>,
    events: Vec<StageUnlockEvent>,
    assessments: Vec<Assessment>,
    subscriptions: HashMap<Uuid, Subscription>,
}

/// In-memory store for tests and ephemeral runs. Keyed maps mirror the
/// sqlite schema's primary keys, so upsert semantics match exactly.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panic elsewhere; the data is still
        // coherent for reads and overwrites.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressStore for MemoryStore {
    fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.lock().sessions.insert(token.clone(), user_id);
        Ok(token)
    }

    fn resolve_session(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self.lock().sessions.get(token).copied())
    }

    fn upsert_practice_log(&self, log: &PracticeLog) -> Result<()> {
        let key = (log.user_id, log.practice, log.practice_date);
        self.lock().logs.insert(key, log.clone());
        Ok(())
    }

    fn practice_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PracticeLog>> {
        let inner = self.lock();
        let mut logs: Vec<PracticeLog> = inner
            .logs
            .values()
            .filter(|l| l.user_id == user_id && l.practice_date >= from && l.practice_date <= to)
            .cloned()
            .collect();
        logs.sort_by_key(|l| (l.practice_date, l.practice));
        Ok(logs)
    }

    fn progress(&self, user_id: Uuid) -> Result<Option<UserProgress>> {
        Ok(self.lock().progress.get(&user_id).cloned())
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<()> {
        self.lock()
            .progress
            .insert(progress.user_id, progress.clone());
        Ok(())
    }

    fn record_unlock(&self, event: &StageUnlockEvent) -> Result<()> {
        self.lock().events.push(event.clone());
        Ok(())
    }

    fn unlock_events(&self, user_id: Uuid) -> Result<Vec<StageUnlockEvent>> {
        let inner = self.lock();
        let mut events: Vec<StageUnlockEvent> = inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.unlocked_at);
        Ok(events)
    }

    fn save_assessment(&self, assessment: &Assessment) -> Result<()> {
        let mut inner = self.lock();
        inner.assessments.retain(|a| {
            !(a.user_id == assessment.user_id
                && a.kind == assessment.kind
                && a.assessed_on == assessment.assessed_on)
        });
        inner.assessments.push(assessment.clone());
        Ok(())
    }

    fn baseline(&self, user_id: Uuid) -> Result<Option<Assessment>> {
        let inner = self.lock();
        Ok(inner
            .assessments
            .iter()
            .filter(|a| a.user_id == user_id && a.kind == AssessmentKind::Baseline)
            .max_by_key(|a| a.assessed_on)
            .cloned())
    }

    fn latest_weekly(&self, user_id: Uuid) -> Result<Option<Assessment>> {
        let inner = self.lock();
        Ok(inner
            .assessments
            .iter()
            .filter(|a| a.user_id == user_id && a.kind == AssessmentKind::Weekly)
            .max_by_key(|a| a.assessed_on)
            .cloned())
    }

    fn subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        Ok(self.lock().subscriptions.get(&user_id).cloned())
    }

    fn set_subscription(&self, user_id: Uuid, subscription: &Subscription) -> Result<()> {
        self.lock()
            .subscriptions
            .insert(user_id, subscription.clone());
        Ok(())
    }
}
