use crate::common::{DatabaseError, DatabaseResult};
use sea_orm::DatabaseConnection;
use std::time::{Duration, Instant};

/// Round-trips to the server; returns the observed latency.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<Duration> {
    let started = Instant::now();
    db.ping()
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;
    Ok(started.elapsed())
}
