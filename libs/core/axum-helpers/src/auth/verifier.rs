//! Resource-server side token verification.

use super::config::KeycloakConfig;
use super::error::{AuthError, AuthResult};
use super::principal::{KeycloakClaims, Principal};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    jwk::{Jwk, JwkSet},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Minimum spacing between JWKS refetches triggered by unknown `kid`s.
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Where the realm signing keys come from when a refetch is needed.
struct JwksEndpoint {
    uri: String,
    http: reqwest::Client,
}

struct RealmKeys {
    keys: RwLock<JwkSet>,
    /// `None` for a fixed key set.
    endpoint: Option<JwksEndpoint>,
    last_refresh: Mutex<Option<Instant>>,
}

enum KeySource {
    Jwks(RealmKeys),
    Secret(String),
    /// No identity provider configured: every token is rejected.
    Disabled,
}

struct Inner {
    issuer: String,
    client_id: String,
    keys: KeySource,
}

/// Verifies bearer tokens and turns them into [`Principal`]s.
///
/// Checks signature, expiry and issuer. Audience is not checked because
/// Keycloak access tokens carry `account` rather than the API client id.
///
/// With realm keys, a token naming an unknown `kid` triggers one JWKS refetch
/// (at most every [`JWKS_REFRESH_INTERVAL`]) so key rotation needs no restart.
#[derive(Clone)]
pub struct TokenVerifier {
    inner: Arc<Inner>,
}

impl TokenVerifier {
    /// HS256 with a shared secret.
    pub fn with_secret(config: &KeycloakConfig, secret: impl Into<String>) -> Self {
        Self::build(config, KeySource::Secret(secret.into()))
    }

    /// RS256 keys from an already fetched JWKS document, never refetched.
    pub fn with_jwks(config: &KeycloakConfig, jwks: JwkSet) -> Self {
        Self::build(config, KeySource::Jwks(RealmKeys::new(jwks, None)))
    }

    /// Rejects every token, so protected routes answer 401.
    pub fn disabled(config: &KeycloakConfig) -> Self {
        Self::build(config, KeySource::Disabled)
    }

    fn build(config: &KeycloakConfig, keys: KeySource) -> Self {
        Self {
            inner: Arc::new(Inner {
                issuer: config.issuer(),
                client_id: config.client_id.clone(),
                keys,
            }),
        }
    }

    /// Uses the shared secret when one is configured, otherwise loads the
    /// realm JWKS.
    pub async fn from_config(config: &KeycloakConfig, http: &reqwest::Client) -> AuthResult<Self> {
        if let Some(secret) = &config.hs256_secret {
            tracing::info!(issuer = %config.issuer(), "Token verification using shared HS256 secret");
            return Ok(Self::with_secret(config, secret.clone()));
        }

        let uri = config.jwks_uri();
        let jwks = fetch_jwks(http, &uri).await?;
        tracing::info!(jwks_uri = %uri, keys = jwks.keys.len(), "Loaded realm signing keys");

        let endpoint = JwksEndpoint {
            uri,
            http: http.clone(),
        };
        Ok(Self::build(
            config,
            KeySource::Jwks(RealmKeys::new(jwks, Some(endpoint))),
        ))
    }

    pub fn issuer(&self) -> &str {
        &self.inner.issuer
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.inner.keys, KeySource::Disabled)
    }

    pub async fn verify(&self, token: &str) -> AuthResult<Principal> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let (key, algorithm) = match &self.inner.keys {
            KeySource::Disabled => {
                return Err(AuthError::InvalidToken(
                    "token verification is not configured".to_string(),
                ));
            }
            KeySource::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            KeySource::Jwks(realm) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AuthError::InvalidToken("token has no kid".to_string()))?;
                let jwk = realm.key_for(kid).await?;
                let key = DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
                (key, Algorithm::RS256)
            }
        };

        if header.alg != algorithm {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[self.inner.issuer.as_str()]);
        validation.validate_aud = false;

        let data = decode::<KeycloakClaims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims.into_principal(&self.inner.client_id))
    }
}

impl RealmKeys {
    fn new(jwks: JwkSet, endpoint: Option<JwksEndpoint>) -> Self {
        Self {
            keys: RwLock::new(jwks),
            endpoint,
            last_refresh: Mutex::new(None),
        }
    }

    async fn key_for(&self, kid: &str) -> AuthResult<Jwk> {
        if let Some(jwk) = self.keys.read().await.find(kid) {
            return Ok(jwk.clone());
        }

        self.refresh(kid).await;

        self.keys
            .read()
            .await
            .find(kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key {}", kid)))
    }

    /// Refetches the key set unless another request just did. Failures are
    /// logged and leave the current keys in place.
    async fn refresh(&self, kid: &str) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };

        // Held across the fetch so concurrent misses wait for one request.
        let mut last_refresh = self.last_refresh.lock().await;
        if self.keys.read().await.find(kid).is_some() {
            return;
        }
        if last_refresh.is_some_and(|at| at.elapsed() < JWKS_REFRESH_INTERVAL) {
            tracing::debug!(kid, "Unknown signing key, JWKS refreshed recently");
            return;
        }
        *last_refresh = Some(Instant::now());

        match fetch_jwks(&endpoint.http, &endpoint.uri).await {
            Ok(jwks) => {
                tracing::info!(kid, keys = jwks.keys.len(), "Reloaded realm signing keys");
                *self.keys.write().await = jwks;
            }
            Err(e) => tracing::warn!(kid, "JWKS refresh failed: {}", e),
        }
    }
}

async fn fetch_jwks(http: &reqwest::Client, uri: &str) -> AuthResult<JwkSet> {
    let response = http
        .get(uri)
        .send()
        .await
        .map_err(|e| AuthError::Upstream(format!("JWKS request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Upstream(format!(
            "JWKS request returned {}: {}",
            status, body
        )));
    }

    response
        .json::<JwkSet>()
        .await
        .map_err(|e| AuthError::Upstream(format!("Failed to parse JWKS: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::principal::RoleClaim;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const SECRET: &str = "test-secret-with-at-least-32-bytes!!";

    pub fn config() -> KeycloakConfig {
        KeycloakConfig::new("http://keycloak.test", "store", "store-api").with_hs256_secret(SECRET)
    }

    pub fn sign(claims: &KeycloakClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn claims(sub: &str, realm_roles: &[&str]) -> KeycloakClaims {
        KeycloakClaims {
            sub: sub.to_string(),
            email: Some(format!("{sub}@example.com")),
            preferred_username: Some(sub.to_string()),
            email_verified: true,
            realm_access: Some(RoleClaim {
                roles: realm_roles.iter().map(|r| r.to_string()).collect(),
            }),
            exp: chrono::Utc::now().timestamp() + 300,
            iss: Some(config().issuer()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_principal() {
        let verifier = TokenVerifier::with_secret(&config(), SECRET);
        let principal = verifier.verify(&sign(&claims("user-1", &["admin"]))).await.unwrap();
        assert_eq!(principal.user_id, "user-1");
        assert!(principal.has_role("admin"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = TokenVerifier::with_secret(&config(), SECRET);
        let mut expired = claims("user-1", &[]);
        expired.exp = chrono::Utc::now().timestamp() - 3600;
        assert!(matches!(
            verifier.verify(&sign(&expired)).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_issuer_rejected() {
        let verifier = TokenVerifier::with_secret(&config(), SECRET);
        let mut foreign = claims("user-1", &[]);
        foreign.iss = Some("http://evil.test/realms/store".to_string());
        assert!(verifier.verify(&sign(&foreign)).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let verifier = TokenVerifier::with_secret(&config(), "another-secret-with-at-least-32-bytes");
        assert!(verifier.verify(&sign(&claims("user-1", &[]))).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let verifier = TokenVerifier::with_secret(&config(), SECRET);
        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_jwks_requires_kid() {
        let verifier = TokenVerifier::with_jwks(&config(), JwkSet { keys: vec![] });
        let err = verifier.verify(&sign(&claims("user-1", &[]))).await.unwrap_err();
        assert!(err.to_string().contains("kid"));
    }

    #[tokio::test]
    async fn test_disabled_verifier_rejects_valid_tokens() {
        let verifier = TokenVerifier::disabled(&KeycloakConfig::default());
        assert!(!verifier.is_enabled());
        let err = verifier.verify(&sign(&claims("user-1", &[]))).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(ref msg) if msg.contains("not configured")));
    }

    mod rotation {
        use super::*;
        use axum::{Json, Router, routing::get};
        use serde_json::{Value, json};
        use std::sync::atomic::{AtomicUsize, Ordering};

        const PRIVATE_KEY: &str = include_str!("../../testdata/realm_rsa.pem");
        const MODULUS: &str = include_str!("../../testdata/realm_rsa.n");
        const CERTS_PATH: &str = "/realms/store/protocol/openid-connect/certs";

        fn jwk(kid: &str) -> Value {
            json!({
                "kty": "RSA",
                "kid": kid,
                "use": "sig",
                "alg": "RS256",
                "n": MODULUS.trim(),
                "e": "AQAB",
            })
        }

        fn sign_rs256(kid: &str, claims: &KeycloakClaims) -> String {
            let mut header = Header::new(Algorithm::RS256);
            header.kid = Some(kid.to_string());
            encode(
                &header,
                claims,
                &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
            )
            .unwrap()
        }

        /// Realm that serves `old-key` on the first JWKS request and adds
        /// `new-key` on every later one.
        async fn rotating_realm() -> (KeycloakConfig, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            let counter = fetches.clone();
            let router = Router::new().route(
                CERTS_PATH,
                get(move || {
                    let counter = counter.clone();
                    async move {
                        let keys = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                            vec![jwk("old-key")]
                        } else {
                            vec![jwk("old-key"), jwk("new-key")]
                        };
                        Json(json!({ "keys": keys }))
                    }
                }),
            );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });

            let config = KeycloakConfig::new(format!("http://{}", addr), "store", "store-api");
            (config, fetches)
        }

        fn realm_claims(config: &KeycloakConfig, sub: &str) -> KeycloakClaims {
            KeycloakClaims {
                iss: Some(config.issuer()),
                ..claims(sub, &["customer"])
            }
        }

        #[tokio::test]
        async fn test_known_key_needs_no_refetch() {
            let (config, fetches) = rotating_realm().await;
            let verifier = TokenVerifier::from_config(&config, &reqwest::Client::new())
                .await
                .unwrap();

            let token = sign_rs256("old-key", &realm_claims(&config, "user-1"));
            let principal = verifier.verify(&token).await.unwrap();

            assert_eq!(principal.user_id, "user-1");
            assert_eq!(fetches.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_rotated_key_is_picked_up_without_restart() {
            let (config, fetches) = rotating_realm().await;
            let verifier = TokenVerifier::from_config(&config, &reqwest::Client::new())
                .await
                .unwrap();

            let token = sign_rs256("new-key", &realm_claims(&config, "user-2"));
            let principal = verifier.verify(&token).await.unwrap();

            assert_eq!(principal.user_id, "user-2");
            assert_eq!(fetches.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_unknown_keys_refetch_at_most_once_per_interval() {
            let (config, fetches) = rotating_realm().await;
            let verifier = TokenVerifier::from_config(&config, &reqwest::Client::new())
                .await
                .unwrap();

            for _ in 0..3 {
                let token = sign_rs256("ghost-key", &realm_claims(&config, "user-3"));
                let err = verifier.verify(&token).await.unwrap_err();
                assert!(err.to_string().contains("unknown signing key"));
            }
            assert_eq!(fetches.load(Ordering::SeqCst), 2);

            // The refreshed set still serves the rotated key without another fetch.
            let token = sign_rs256("new-key", &realm_claims(&config, "user-3"));
            assert!(verifier.verify(&token).await.is_ok());
            assert_eq!(fetches.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_fixed_key_set_never_fetches() {
            let config = KeycloakConfig::new("http://keycloak.test", "store", "store-api");
            let jwks: JwkSet = serde_json::from_value(json!({ "keys": [jwk("old-key")] })).unwrap();
            let verifier = TokenVerifier::with_jwks(&config, jwks);

            let token = sign_rs256("new-key", &realm_claims(&config, "user-4"));
            assert!(verifier.verify(&token).await.is_err());

            let token = sign_rs256("old-key", &realm_claims(&config, "user-4"));
            assert!(verifier.verify(&token).await.is_ok());
        }
    }
}
