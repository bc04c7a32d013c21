use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::assessment::{Assessment, AssessmentKind, DomainScores};
use crate::error::Result;
use crate::practice::PracticeLog;
use crate::progress::{StageUnlockEvent, UserProgress};
use crate::store::ProgressStore;
use crate::subscription::Subscription;
use crate::types::{PracticeType, Stage, SubscriptionStatus};

/// One idempotent batch; every statement tolerates re-running, so opening a
/// store bootstraps or upgrades in one shot.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    token       TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    issued_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

CREATE TABLE IF NOT EXISTS practice_logs (
    user_id       TEXT NOT NULL,
    practice      TEXT NOT NULL,
    practice_date TEXT NOT NULL,
    stage         INTEGER NOT NULL,
    completed     INTEGER NOT NULL,
    completed_at  TEXT,
    notes         TEXT,
    PRIMARY KEY (user_id, practice, practice_date)
);
CREATE INDEX IF NOT EXISTS idx_practice_logs_user_date ON practice_logs(user_id, practice_date);

CREATE TABLE IF NOT EXISTS user_progress (
    user_id                 TEXT PRIMARY KEY,
    current_stage           INTEGER NOT NULL,
    adherence_percentage    INTEGER NOT NULL,
    consecutive_days        INTEGER NOT NULL,
    stage_start_date        TEXT NOT NULL,
    unlock_eligible         INTEGER NOT NULL,
    has_active_subscription INTEGER NOT NULL,
    updated_at              TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stage_unlock_events (
    id                  TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL,
    from_stage          INTEGER NOT NULL,
    to_stage            INTEGER NOT NULL,
    unlocked_at         TEXT NOT NULL,
    adherence_at_unlock INTEGER NOT NULL,
    delta_at_unlock     REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_unlock_events_user ON stage_unlock_events(user_id, unlocked_at);

CREATE TABLE IF NOT EXISTS assessments (
    user_id     TEXT NOT NULL,
    kind        TEXT NOT NULL,
    assessed_on TEXT NOT NULL,
    regulation  REAL NOT NULL,
    awareness   REAL NOT NULL,
    outlook     REAL NOT NULL,
    attention   REAL NOT NULL,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (user_id, kind, assessed_on)
);

CREATE TABLE IF NOT EXISTS subscriptions (
    user_id              TEXT PRIMARY KEY,
    status               TEXT NOT NULL,
    cancel_at_period_end INTEGER NOT NULL,
    current_period_end   TEXT
);
"#;

/// SQLite-backed store. The connection sits behind a mutex; every trait
/// call is one short statement, so contention stays negligible at this
/// service's request rates.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Column helpers
// ---------------------------------------------------------------------------

fn bad_column<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| bad_column(idx, e))
}

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| bad_column(idx, e))
}

fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| bad_column(idx, e))
}

fn opt_ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| bad_column(idx, e))
    })
    .transpose()
}

fn stage_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Stage> {
    let n: i64 = row.get(idx)?;
    u8::try_from(n)
        .ok()
        .and_then(|n| Stage::new(n).ok())
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, n))
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

fn map_practice_log(row: &Row<'_>) -> rusqlite::Result<PracticeLog> {
    let practice: String = row.get(1)?;
    Ok(PracticeLog {
        user_id: uuid_col(row, 0)?,
        practice: practice
            .parse::<PracticeType>()
            .map_err(|e| bad_column(1, e))?,
        practice_date: date_col(row, 2)?,
        stage: stage_col(row, 3)?,
        completed: row.get(4)?,
        completed_at: opt_ts_col(row, 5)?,
        notes: row.get(6)?,
    })
}

fn map_progress(row: &Row<'_>) -> rusqlite::Result<UserProgress> {
    Ok(UserProgress {
        user_id: uuid_col(row, 0)?,
        current_stage: stage_col(row, 1)?,
        adherence_percentage: row.get(2)?,
        consecutive_days: row.get(3)?,
        stage_start_date: date_col(row, 4)?,
        unlock_eligible: row.get(5)?,
        has_active_subscription: row.get(6)?,
        updated_at: ts_col(row, 7)?,
    })
}

fn map_unlock_event(row: &Row<'_>) -> rusqlite::Result<StageUnlockEvent> {
    Ok(StageUnlockEvent {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        from_stage: stage_col(row, 2)?,
        to_stage: stage_col(row, 3)?,
        unlocked_at: ts_col(row, 4)?,
        adherence_at_unlock: row.get(5)?,
        delta_at_unlock: row.get(6)?,
    })
}

fn map_assessment(row: &Row<'_>) -> rusqlite::Result<Assessment> {
    let kind: String = row.get(1)?;
    Ok(Assessment {
        user_id: uuid_col(row, 0)?,
        kind: kind
            .parse::<AssessmentKind>()
            .map_err(|e| bad_column(1, e))?,
        assessed_on: date_col(row, 2)?,
        scores: DomainScores {
            regulation: row.get(3)?,
            awareness: row.get(4)?,
            outlook: row.get(5)?,
            attention: row.get(6)?,
        },
        recorded_at: ts_col(row, 7)?,
    })
}

fn map_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let status: String = row.get(0)?;
    Ok(Subscription {
        status: status
            .parse::<SubscriptionStatus>()
            .map_err(|e| bad_column(0, e))?,
        cancel_at_period_end: row.get(1)?,
        current_period_end: opt_ts_col(row, 2)?,
    })
}

// ---------------------------------------------------------------------------
// ProgressStore impl
// ---------------------------------------------------------------------------

impl ProgressStore for SqliteStore {
    fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, issued_at) VALUES (?1, ?2, ?3)",
            params![token, user_id.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(token)
    }

    fn resolve_session(&self, token: &str) -> Result<Option<Uuid>> {
        let user = self
            .conn()
            .query_row(
                "SELECT user_id FROM sessions WHERE token = ?1",
                params![token],
                |row| uuid_col(row, 0),
            )
            .optional()?;
        Ok(user)
    }

    fn upsert_practice_log(&self, log: &PracticeLog) -> Result<()> {
        self.conn().execute(
            "INSERT INTO practice_logs
                 (user_id, practice, practice_date, stage, completed, completed_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, practice, practice_date) DO UPDATE SET
                 stage = excluded.stage,
                 completed = excluded.completed,
                 completed_at = excluded.completed_at,
                 notes = excluded.notes",
            params![
                log.user_id.to_string(),
                log.practice.as_str(),
                log.practice_date.to_string(),
                log.stage.number(),
                log.completed,
                log.completed_at.map(|t| t.to_rfc3339()),
                log.notes,
            ],
        )?;
        Ok(())
    }

    fn practice_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PracticeLog>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, practice, practice_date, stage, completed, completed_at, notes
             FROM practice_logs
             WHERE user_id = ?1 AND practice_date >= ?2 AND practice_date <= ?3
             ORDER BY practice_date ASC, practice ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id.to_string(), from.to_string(), to.to_string()],
            map_practice_log,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn progress(&self, user_id: Uuid) -> Result<Option<UserProgress>> {
        let progress = self
            .conn()
            .query_row(
                "SELECT user_id, current_stage, adherence_percentage, consecutive_days,
                        stage_start_date, unlock_eligible, has_active_subscription, updated_at
                 FROM user_progress WHERE user_id = ?1",
                params![user_id.to_string()],
                map_progress,
            )
            .optional()?;
        Ok(progress)
    }

    fn save_progress(&self, progress: &UserProgress) -> Result<()> {
        self.conn().execute(
            "INSERT INTO user_progress
                 (user_id, current_stage, adherence_percentage, consecutive_days,
                  stage_start_date, unlock_eligible, has_active_subscription, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
                 current_stage = excluded.current_stage,
                 adherence_percentage = excluded.adherence_percentage,
                 consecutive_days = excluded.consecutive_days,
                 stage_start_date = excluded.stage_start_date,
                 unlock_eligible = excluded.unlock_eligible,
                 has_active_subscription = excluded.has_active_subscription,
                 updated_at = excluded.updated_at",
            params![
                progress.user_id.to_string(),
                progress.current_stage.number(),
                progress.adherence_percentage,
                progress.consecutive_days,
                progress.stage_start_date.to_string(),
                progress.unlock_eligible,
                progress.has_active_subscription,
                progress.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn record_unlock(&self, event: &StageUnlockEvent) -> Result<()> {
        self.conn().execute(
            "INSERT INTO stage_unlock_events
                 (id, user_id, from_stage, to_stage, unlocked_at,
                  adherence_at_unlock, delta_at_unlock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id.to_string(),
                event.user_id.to_string(),
                event.from_stage.number(),
                event.to_stage.number(),
                event.unlocked_at.to_rfc3339(),
                event.adherence_at_unlock,
                event.delta_at_unlock,
            ],
        )?;
        Ok(())
    }

    fn unlock_events(&self, user_id: Uuid) -> Result<Vec<StageUnlockEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, from_stage, to_stage, unlocked_at,
                    adherence_at_unlock, delta_at_unlock
             FROM stage_unlock_events
             WHERE user_id = ?1
             ORDER BY unlocked_at ASC",
        )?;
        let rows = stmt.query_map(params![user_id.to_string()], map_unlock_event)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn save_assessment(&self, assessment: &Assessment) -> Result<()> {
        self.conn().execute(
            "INSERT INTO assessments
                 (user_id, kind, assessed_on, regulation, awareness, outlook, attention,
                  recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id, kind, assessed_on) DO UPDATE SET
                 regulation = excluded.regulation,
                 awareness = excluded.awareness,
                 outlook = excluded.outlook,
                 attention = excluded.attention,
                 recorded_at = excluded.recorded_at",
            params![
                assessment.user_id.to_string(),
                assessment.kind.as_str(),
                assessment.assessed_on.to_string(),
                assessment.scores.regulation,
                assessment.scores.awareness,
                assessment.scores.outlook,
                assessment.scores.attention,
                assessment.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn baseline(&self, user_id: Uuid) -> Result<Option<Assessment>> {
        let assessment = self
            .conn()
            .query_row(
                "SELECT user_id, kind, assessed_on, regulation, awareness, outlook, attention,
                        recorded_at
                 FROM assessments
                 WHERE user_id = ?1 AND kind = 'baseline'
                 ORDER BY assessed_on DESC LIMIT 1",
                params![user_id.to_string()],
                map_assessment,
            )
            .optional()?;
        Ok(assessment)
    }

    fn latest_weekly(&self, user_id: Uuid) -> Result<Option<Assessment>> {
        let assessment = self
            .conn()
            .query_row(
                "SELECT user_id, kind, assessed_on, regulation, awareness, outlook, attention,
                        recorded_at
                 FROM assessments
                 WHERE user_id = ?1 AND kind = 'weekly'
                 ORDER BY assessed_on DESC LIMIT 1",
                params![user_id.to_string()],
                map_assessment,
            )
            .optional()?;
        Ok(assessment)
    }

    fn subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        let subscription = self
            .conn()
            .query_row(
                "SELECT status, cancel_at_period_end, current_period_end
                 FROM subscriptions WHERE user_id = ?1",
                params![user_id.to_string()],
                map_subscription,
            )
            .optional()?;
        Ok(subscription)
    }

    fn set_subscription(&self, user_id: Uuid, subscription: &Subscription) -> Result<()> {
        self.conn().execute(
            "INSERT INTO subscriptions (user_id, status, cancel_at_period_end, current_period_end)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 status = excluded.status,
                 cancel_at_period_end = excluded.cancel_at_period_end,
                 current_period_end = excluded.current_period_end",
            params![
                user_id.to_string(),
                subscription.status.as_str(),
                subscription.cancel_at_period_end,
                subscription.current_period_end.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
