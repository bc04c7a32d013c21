use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The user behind a valid `Authorization: Bearer <token>` header. Tokens
/// are opaque session strings resolved through the store.
pub struct AuthedUser(pub Uuid);

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_bearer_token",
                "rejected request without bearer token"
            );
            return Err(ApiError::unauthorized());
        };

        let token = token.trim().to_owned();
        let store = state.store.clone();
        let resolved = tokio::task::spawn_blocking(move || store.resolve_session(&token))
            .await
            .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

        match resolved {
            Some(user_id) => Ok(AuthedUser(user_id)),
            None => {
                tracing::warn!(
                    event = "auth_failure",
                    reason = "unknown_session",
                    "rejected unknown session token"
                );
                Err(ApiError::unauthorized())
            }
        }
    }
}
