pub mod auth;
pub mod error;
pub mod extract;
pub mod limit;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness
        .route("/health", get(routes::health::health))
        // Practices
        .route("/api/practices/log", post(routes::practices::log_practice))
        .route("/api/practices", get(routes::practices::list_practices))
        // Progress
        .route("/api/progress", get(routes::progress::get_progress))
        .route("/api/progress/unlock", post(routes::progress::unlock))
        .route("/api/progress/events", get(routes::progress::list_events))
        // Assessments
        .route(
            "/api/assessments/baseline",
            post(routes::assessments::submit_baseline),
        )
        .route(
            "/api/assessments/weekly",
            post(routes::assessments::submit_weekly),
        )
        .route(
            "/api/assessments/delta",
            get(routes::assessments::get_delta),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on `bind:port`.
pub async fn serve(state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(state, listener).await
}

/// Start the API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so
/// the caller can read the actual address first (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app = build_router(state);

    tracing::info!("ascent API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
