use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[error("Connection failed after {attempts} attempts: {message}")]
    ConnectionFailed { attempts: u32, message: String },

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration failed: {0}")]
    MigrationError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
