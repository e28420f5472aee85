use crate::common::RetryConfig;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use sea_orm::ConnectOptions;
use std::time::Duration;

/// Connection pool settings for PostgreSQL.
///
/// ```ignore
/// let config = PostgresConfig::new("postgres://store:secret@db/store").with_pool_size(20, 2);
/// let db = database::postgres::connect_from_config(config).await?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PostgresConfig {
    /// Empty when `DATABASE_URL` is unset; connecting then fails with a
    /// connection error rather than at configuration time.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    /// Log every statement through sqlx.
    pub sqlx_logging: bool,
    /// Applied while establishing the first connection.
    pub retry: RetryConfig,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_pool_size(mut self, max_connections: u32, min_connections: u32) -> Self {
        self.max_connections = max_connections;
        self.min_connections = min_connections.min(max_connections);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .sqlx_logging(self.sqlx_logging);
        opt
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(8),
            acquire_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
            sqlx_logging: false,
            retry: RetryConfig::default(),
        }
    }
}

/// Environment variables (all optional):
/// - `DATABASE_URL`
/// - `DB_MAX_CONNECTIONS` (20), `DB_MIN_CONNECTIONS` (2)
/// - `DB_CONNECT_TIMEOUT_SECS` (8), `DB_ACQUIRE_TIMEOUT_SECS` (8)
/// - `DB_IDLE_TIMEOUT_SECS` (600), `DB_MAX_LIFETIME_SECS` (1800)
/// - `DB_SQLX_LOGGING` (false)
/// - `DB_CONNECT_RETRIES` (5), `DB_RETRY_DELAY_MS` (500)
///
/// A missing URL is reported by settings validation, not here.
impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            env_parse(key, default.as_secs()).map(Duration::from_secs)
        };

        let max_connections = env_parse("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections = env_parse("DB_MIN_CONNECTIONS", defaults.min_connections)?;
        if min_connections > max_connections {
            return Err(ConfigError::ParseError {
                key: "DB_MIN_CONNECTIONS".to_string(),
                details: format!("{min_connections} exceeds DB_MAX_CONNECTIONS ({max_connections})"),
            });
        }

        let retry = RetryConfig::new(
            env_parse("DB_CONNECT_RETRIES", defaults.retry.max_retries)?,
            Duration::from_millis(env_parse(
                "DB_RETRY_DELAY_MS",
                defaults.retry.initial_delay.as_millis() as u64,
            )?),
        );

        Ok(Self {
            url: env_or_default("DATABASE_URL", ""),
            max_connections,
            min_connections,
            connect_timeout: secs("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            acquire_timeout: secs("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
            idle_timeout: secs("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
            max_lifetime: secs("DB_MAX_LIFETIME_SECS", defaults.max_lifetime)?,
            sqlx_logging: env_parse("DB_SQLX_LOGGING", defaults.sqlx_logging)?,
            retry,
        })
    }
}
