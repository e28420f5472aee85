//! Token verifier selection at startup.

use crate::config::Settings;
use axum_helpers::TokenVerifier;
use tracing::warn;

/// Builds the verifier for `settings.keycloak`.
///
/// Outside production an unconfigured realm is tolerated: every token is
/// rejected, so protected routes answer 401 while public ones keep working.
pub async fn token_verifier(
    settings: &Settings,
    http: &reqwest::Client,
) -> eyre::Result<TokenVerifier> {
    let keycloak = &settings.keycloak;

    if !keycloak.is_configured() {
        if settings.environment.is_production() {
            eyre::bail!("Identity provider is not configured (KEYCLOAK_URL, KEYCLOAK_REALM)");
        }
        warn!(
            environment = %settings.environment,
            "Identity provider not configured, every bearer token will be rejected"
        );
        return Ok(TokenVerifier::disabled(keycloak));
    }

    TokenVerifier::from_config(keycloak, http)
        .await
        .map_err(|e| eyre::eyre!("Identity provider setup failed: {}", e))
}
