use axum_helpers::KeycloakConfig;
use core_config::validation::{SecretsCheck, ValidationReport};
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_list, env_optional, env_or_default,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Payment provider credentials. Only checked at startup; payment capture is
/// handled outside this service.
#[derive(Clone, Debug, Default)]
pub struct PaymentSettings {
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
}

impl FromEnv for PaymentSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stripe_secret_key: env_optional("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: env_optional("STRIPE_WEBHOOK_SECRET"),
            razorpay_key_id: env_optional("RAZORPAY_KEY_ID"),
            razorpay_key_secret: env_optional("RAZORPAY_KEY_SECRET"),
        })
    }
}

/// S3 compatible object storage for product media.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    /// `S3_ENDPOINT`, falling back to `MINIO_ENDPOINT`.
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl FromEnv for StorageSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: env_optional("S3_ENDPOINT").or_else(|| env_optional("MINIO_ENDPOINT")),
            bucket: env_or_default("S3_BUCKET", "store-media"),
            region: env_or_default("S3_REGION", "us-east-1"),
            access_key: env_optional("S3_ACCESS_KEY"),
            secret_key: env_optional("S3_SECRET_KEY"),
        })
    }
}

/// Store API settings, composed from the shared config components.
///
/// Built once in `main`, validated, then moved into `AppState`.
#[derive(Clone, Debug)]
pub struct Settings {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub keycloak: KeycloakConfig,
    pub payments: PaymentSettings,
    pub storage: StorageSettings,
    pub redis_url: Option<String>,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub default_currency: String,
}

impl Settings {
    /// Reads every field from the environment.
    ///
    /// Missing variables never fail here; only a present value that does not
    /// parse does. Required secrets are checked by [`Settings::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            keycloak: KeycloakConfig::from_env()?,
            payments: PaymentSettings::from_env()?,
            storage: StorageSettings::from_env()?,
            redis_url: env_optional("REDIS_URL"),
            api_key: env_optional("API_KEY"),
            cors_origins: env_list("CORS_ORIGINS", "http://localhost:3000"),
            default_currency: env_or_default("DEFAULT_CURRENCY", "USD").to_uppercase(),
        })
    }

    /// Missing secrets are fatal in production and warnings elsewhere.
    /// Loopback CORS origins and development database URLs only warn.
    pub fn validate(&self) -> Result<ValidationReport, ConfigError> {
        let keycloak = &self.keycloak;
        let payments = &self.payments;

        SecretsCheck::new(self.environment)
            .require("DATABASE_URL", Some(self.database.url.as_str()))
            .require("KEYCLOAK_URL", Some(keycloak.url.as_str()))
            .require("KEYCLOAK_REALM", Some(keycloak.realm.as_str()))
            .require("KEYCLOAK_CLIENT_ID", Some(keycloak.client_id.as_str()))
            .require("KEYCLOAK_CLIENT_SECRET", Some(keycloak.client_secret.as_str()))
            .require("STRIPE_SECRET_KEY", payments.stripe_secret_key.as_deref())
            .require("STRIPE_WEBHOOK_SECRET", payments.stripe_webhook_secret.as_deref())
            .require("RAZORPAY_KEY_ID", payments.razorpay_key_id.as_deref())
            .require("RAZORPAY_KEY_SECRET", payments.razorpay_key_secret.as_deref())
            .require("S3_ACCESS_KEY", self.storage.access_key.as_deref())
            .require("S3_SECRET_KEY", self.storage.secret_key.as_deref())
            .require("API_KEY", self.api_key.as_deref())
            .cors_origins(&self.cors_origins)
            .database_url(Some(self.database.url.as_str()))
            .finish()
    }
}
