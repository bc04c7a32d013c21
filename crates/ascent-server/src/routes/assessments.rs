use ascent_core::assessment::{AssessmentKind, DomainScores};
use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AssessmentBody {
    pub regulation: f64,
    pub awareness: f64,
    pub outlook: f64,
    pub attention: f64,
    /// Defaults to today.
    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
}

/// POST /api/assessments/baseline — record the one-time baseline.
pub async fn submit_baseline(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    ApiJson(body): ApiJson<AssessmentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    submit(app, user_id, AssessmentKind::Baseline, body).await
}

/// POST /api/assessments/weekly — record a weekly check-in.
pub async fn submit_weekly(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    ApiJson(body): ApiJson<AssessmentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    submit(app, user_id, AssessmentKind::Weekly, body).await
}

async fn submit(
    app: AppState,
    user_id: uuid::Uuid,
    kind: AssessmentKind,
    body: AssessmentBody,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = app.engine.clone();
    let assessment = tokio::task::spawn_blocking(move || {
        let now = Utc::now();
        let scores = DomainScores {
            regulation: body.regulation,
            awareness: body.awareness,
            outlook: body.outlook,
            attention: body.attention,
        };
        let assessed_on = body.assessed_on.unwrap_or_else(|| now.date_naive());
        engine.record_assessment(user_id, kind, assessed_on, scores, now)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({
        "kind": assessment.kind,
        "assessed_on": assessment.assessed_on,
        "scores": assessment.scores,
        "recorded_at": assessment.recorded_at,
    })))
}

/// GET /api/assessments/delta — movement since baseline, per domain and
/// averaged. Null fields until both assessments exist.
pub async fn get_delta(
    State(app): State<AppState>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = app.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.delta_breakdown(user_id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let response = match report {
        Some(report) => serde_json::json!({
            "baseline_on": report.baseline_on,
            "latest_on": report.latest_on,
            "per_domain": report.per_domain,
            "average_delta": report.average,
        }),
        None => serde_json::json!({
            "baseline_on": null,
            "latest_on": null,
            "per_domain": null,
            "average_delta": null,
        }),
    };
    Ok(Json(response))
}
