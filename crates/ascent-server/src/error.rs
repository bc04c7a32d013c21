use ascent_core::AscentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ---------------------------------------------------------------------------
// Internal sentinels for statuses the core error enum does not carry
// ---------------------------------------------------------------------------

/// Private sentinel carrying an explicit HTTP 401 through the
/// `anyhow::Error` chain without touching the `AscentError` enum.
#[derive(Debug)]
struct Unauthorized;

impl std::fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("missing or invalid session token")
    }
}

impl std::error::Error for Unauthorized {}

/// Private sentinel carrying an explicit HTTP 429 through the
/// `anyhow::Error` chain.
#[derive(Debug)]
struct RateLimited;

impl std::fmt::Display for RateLimited {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("too many unlock attempts, try again later")
    }
}

impl std::error::Error for RateLimited {}

// ---------------------------------------------------------------------------
// ApiError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Every error renders as
/// `{ "error": <message>, "code": <machine code>, "details": ... }` with the
/// status and code chosen from the wrapped error.
#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl ApiError {
    /// 401 with code UNAUTHORIZED.
    pub fn unauthorized() -> Self {
        Self(Unauthorized.into())
    }

    /// 429 with code RATE_LIMITED.
    pub fn rate_limited() -> Self {
        Self(RateLimited.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.downcast_ref::<Unauthorized>().is_some() {
            return respond(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", &self.0, None);
        }
        if self.0.downcast_ref::<RateLimited>().is_some() {
            return respond(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", &self.0, None);
        }

        let (status, code, details) = match self.0.downcast_ref::<AscentError>() {
            Some(AscentError::InvalidStage(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_STAGE", None)
            }
            Some(AscentError::NoProgress(_)) => (StatusCode::NOT_FOUND, "NO_PROGRESS", None),
            Some(AscentError::StageSkip { .. }) => {
                (StatusCode::FORBIDDEN, "STAGE_SKIP_ATTEMPT", None)
            }
            Some(AscentError::SubscriptionRequired { target }) => (
                StatusCode::FORBIDDEN,
                "SUBSCRIPTION_REQUIRED",
                Some(serde_json::json!({
                    "target_stage": target,
                    "upgrade": "an active subscription unlocks stages 2 and above",
                })),
            ),
            Some(AscentError::CriteriaNotMet { report }) => (
                StatusCode::BAD_REQUEST,
                "CRITERIA_NOT_MET",
                serde_json::to_value(report).ok(),
            ),
            Some(
                AscentError::AlreadyEnrolled(_)
                | AscentError::UnknownPractice(_)
                | AscentError::UnknownDomain(_)
                | AscentError::UnknownSubscriptionStatus(_)
                | AscentError::Validation(_),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION", None),
            Some(
                AscentError::NotInitialized
                | AscentError::Io(_)
                | AscentError::Yaml(_)
                | AscentError::Sqlite(_),
            )
            | None => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", None),
        };

        respond(status, code, &self.0, details)
    }
}

fn respond(
    status: StatusCode,
    code: &str,
    err: &anyhow::Error,
    details: Option<serde_json::Value>,
) -> Response {
    let mut body = serde_json::json!({ "error": err.to_string(), "code": code });
    if let Some(details) = details {
        body["details"] = details;
    }
    (status, axum::Json(body)).into_response()
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascent_core::criteria::{CriteriaTable, ProgressSnapshot};
    use ascent_core::types::Stage;
    use axum::response::IntoResponse;

    fn stage(n: u8) -> Stage {
        Stage::new(n).unwrap()
    }

    #[test]
    fn invalid_stage_maps_to_400() {
        let err = ApiError(AscentError::InvalidStage("9".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn no_progress_maps_to_404() {
        let err = ApiError(AscentError::NoProgress(uuid::Uuid::new_v4()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn stage_skip_maps_to_403() {
        let err = ApiError(
            AscentError::StageSkip {
                current: Stage::MIN,
                requested: stage(4),
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn subscription_required_maps_to_403() {
        let err = ApiError(AscentError::SubscriptionRequired { target: stage(2) }.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn criteria_not_met_maps_to_400() {
        let criteria = *CriteriaTable::builtin().for_transition(Stage::MIN).unwrap();
        let report = criteria.check(
            Stage::MIN,
            stage(2),
            &ProgressSnapshot {
                adherence_percentage: 10,
                days_in_stage: 2,
                average_delta: None,
            },
        );
        let err = ApiError(AscentError::CriteriaNotMet { report }.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError(AscentError::Validation("notes too long".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_initialized_maps_to_500() {
        let err = ApiError(AscentError::NotInitialized.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = ApiError(AscentError::Io(io_err).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn plain_anyhow_maps_to_500() {
        let err = ApiError(anyhow::anyhow!("something unexpected"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_constructor_maps_to_401() {
        let response = ApiError::unauthorized().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rate_limited_constructor_maps_to_429() {
        let response = ApiError::rate_limited().into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn response_body_is_json() {
        let err = ApiError(AscentError::NoProgress(uuid::Uuid::new_v4()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(
            ct.to_str().unwrap().contains("application/json"),
            "expected JSON content type, got {ct:?}",
        );
    }
}
