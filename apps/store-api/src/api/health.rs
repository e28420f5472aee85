//! Readiness backed by a real PostgreSQL round-trip.

use crate::state::AppState;
use axum::{extract::State, response::Response};
use axum_helpers::{HealthCheckFuture, run_health_checks};

/// 200 when PostgreSQL answers, 503 otherwise.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&state.db)
                .await
                .map(|latency| tracing::debug!(?latency, "Database ping"))
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await
}
