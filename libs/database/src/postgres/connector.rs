use super::config::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, retry_with_backoff};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Connects with the default pool settings.
pub async fn connect(url: &str) -> DatabaseResult<DatabaseConnection> {
    connect_from_config(&PostgresConfig::new(url)).await
}

/// Single connection attempt.
pub async fn connect_from_config(config: &PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    if !config.is_configured() {
        return Err(DatabaseError::ConnectionFailed {
            attempts: 0,
            message: "DATABASE_URL is not set".to_string(),
        });
    }

    let db = Database::connect(config.connect_options()).await?;
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connected to PostgreSQL"
    );
    Ok(db)
}

/// Connects using `config.retry`; meant for startup, where the database may
/// still be coming up.
pub async fn connect_from_config_with_retry(
    config: &PostgresConfig,
) -> DatabaseResult<DatabaseConnection> {
    if !config.is_configured() {
        return connect_from_config(config).await;
    }

    retry_with_backoff("postgres connect", &config.retry, || async {
        Database::connect(config.connect_options()).await
    })
    .await
    .map(|db| {
        info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        db
    })
    .map_err(|e| DatabaseError::ConnectionFailed {
        attempts: config.retry.max_retries + 1,
        message: e.to_string(),
    })
}

/// Applies every pending migration of `M`.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!(app = app_name, "Database migrations complete");
    Ok(())
}
