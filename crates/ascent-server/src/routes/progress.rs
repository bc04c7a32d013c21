use ascent_core::engine::UnlockOutcome;
use ascent_core::types::Stage;
use ascent_core::AscentError;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// GET /api/progress — current stage plus freshly computed adherence,
/// streak, delta, and next-stage criteria.
pub async fn get_progress(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = app.engine.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        engine.summary(user_id, now.date_naive(), now)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(super::summary_json(&summary)))
}

#[derive(serde::Deserialize)]
pub struct UnlockBody {
    /// Kept loose so a non-numeric target maps to INVALID_STAGE instead of
    /// a generic deserialization failure.
    pub target_stage: serde_json::Value,
}

fn parse_target(raw: &serde_json::Value) -> Result<Stage, ApiError> {
    raw.as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .and_then(|n| Stage::new(n).ok())
        .ok_or_else(|| ApiError(AscentError::InvalidStage(raw.to_string()).into()))
}

/// POST /api/progress/unlock — attempt the next stage. Rate limited per
/// user; denials come back as structured errors.
pub async fn unlock(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    ApiJson(body): ApiJson<UnlockBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if app.unlock_limiter.check_key(&user_id).is_err() {
        tracing::warn!(
            event = "rate_limited",
            user = %user_id,
            "unlock quota exhausted"
        );
        return Err(ApiError::rate_limited());
    }
    let target = parse_target(&body.target_stage)?;

    let engine = app.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        engine.attempt_unlock(user_id, target, now.date_naive(), now)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))?;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            if let AscentError::StageSkip { current, requested } = &err {
                tracing::warn!(
                    event = "stage_skip_attempt",
                    user = %user_id,
                    current = %current,
                    requested = %requested,
                    "rejected non-sequential unlock"
                );
            }
            return Err(err.into());
        }
    };

    let response = match outcome {
        UnlockOutcome::Unlocked { event, .. } => serde_json::json!({
            "success": true,
            "previous_stage": event.from_stage,
            "new_stage": event.to_stage,
            "message": format!("stage {} unlocked", event.to_stage),
        }),
        UnlockOutcome::PendingReview { stage, target, .. } => serde_json::json!({
            "success": false,
            "pending_review": true,
            "current_stage": stage,
            "target_stage": target,
            "message": format!("all criteria met; stage {target} awaits coach review"),
        }),
    };
    Ok(Json(response))
}

/// GET /api/progress/events — unlock history, oldest first.
pub async fn list_events(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let events = tokio::task::spawn_blocking(move || store.unlock_events(user_id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "events": events })))
}
