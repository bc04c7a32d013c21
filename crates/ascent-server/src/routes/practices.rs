use ascent_core::adherence::window_start;
use ascent_core::engine::LogRequest;
use ascent_core::AscentError;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /api/practices/log — upsert one practice entry and return the
/// refreshed progress.
pub async fn log_practice(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    ApiJson(body): ApiJson<LogRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = app.engine.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        engine.log_practice(user_id, body, now.date_naive(), now)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(super::summary_json(&summary)))
}

#[derive(serde::Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// GET /api/practices?from=&to= — practice entries in a date range, both
/// ends inclusive. Defaults to the trailing adherence window.
pub async fn list_practices(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Query(range): Query<RangeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let today = Utc::now().date_naive();
        let from = range.from.unwrap_or_else(|| window_start(today));
        let to = range.to.unwrap_or(today);
        let logs = store.practice_logs(user_id, from, to)?;
        Ok::<_, AscentError>(serde_json::json!({
            "from": from,
            "to": to,
            "logs": logs,
        }))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
