//! PostgreSQL access for the store services.
//!
//! - [`postgres`]: pool configuration, connection with retry, migrations, health check
//! - [`common`]: shared error type and retry/backoff helper
//! - [`BaseRepository`]: thin SeaORM CRUD wrapper the domain repositories build on
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use core_config::FromEnv;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(&config).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "store-api").await?;
//! ```

pub mod common;
pub mod postgres;
mod repository;

pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};
pub use repository::{BaseRepository, UuidEntity};
