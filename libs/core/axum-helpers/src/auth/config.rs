//! Identity provider configuration.

use core_config::{ConfigError, FromEnv, env_optional, env_or_default};

/// Keycloak realm settings.
///
/// Loaded from environment variables; none of them is required at load time,
/// missing values are reported by the application's startup validation:
/// - `KEYCLOAK_URL` - base URL, e.g. `https://auth.example.com`
/// - `KEYCLOAK_REALM`
/// - `KEYCLOAK_CLIENT_ID`
/// - `KEYCLOAK_CLIENT_SECRET`
/// - `KEYCLOAK_ADMIN_ROLE` (default `admin`)
/// - `AUTH_HS256_SECRET` - optional shared secret; when set, tokens are
///   verified with HS256 instead of the realm JWKS (local development, tests)
#[derive(Clone, Debug, Default)]
pub struct KeycloakConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub admin_role: String,
    pub hs256_secret: Option<String>,
}

impl KeycloakConfig {
    pub fn new(url: impl Into<String>, realm: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            admin_role: "admin".to_string(),
            ..Self::default()
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = secret.into();
        self
    }

    pub fn with_hs256_secret(mut self, secret: impl Into<String>) -> Self {
        self.hs256_secret = Some(secret.into());
        self
    }

    /// `{url}/realms/{realm}`, the expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.url.trim_end_matches('/'), self.realm)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.issuer())
    }

    pub fn jwks_uri(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.issuer())
    }

    /// True when enough is configured to verify tokens at all.
    pub fn is_configured(&self) -> bool {
        self.hs256_secret.is_some() || (!self.url.is_empty() && !self.realm.is_empty())
    }
}

impl FromEnv for KeycloakConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("KEYCLOAK_URL", ""),
            realm: env_or_default("KEYCLOAK_REALM", ""),
            client_id: env_or_default("KEYCLOAK_CLIENT_ID", ""),
            client_secret: env_or_default("KEYCLOAK_CLIENT_SECRET", ""),
            admin_role: env_or_default("KEYCLOAK_ADMIN_ROLE", "admin"),
            hs256_secret: env_optional("AUTH_HS256_SECRET"),
        })
    }
}
