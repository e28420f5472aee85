//! Client-credentials exchange for service-to-service calls.

use super::config::KeycloakConfig;
use super::error::{AuthError, AuthResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Short-lived token issued to this service.
#[derive(Debug, Clone)]
pub struct ServiceToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub token_type: String,
}

/// Requests service tokens from the realm token endpoint.
///
/// Every call performs a fresh exchange; callers own refresh.
#[derive(Clone)]
pub struct ServiceTokenClient {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
}

impl ServiceTokenClient {
    pub fn new(http: reqwest::Client, config: &KeycloakConfig) -> Self {
        Self {
            http,
            token_endpoint: config.token_endpoint(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    pub async fn get_service_token(&self) -> AuthResult<ServiceToken> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Client credentials exchange rejected");
            return Err(AuthError::Upstream(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Upstream(format!("Failed to parse token response: {}", e)))?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Upstream("Token response has no access_token".to_string()))?;

        Ok(ServiceToken {
            access_token,
            expires_in: token.expires_in,
            token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Form, Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::json;
    use std::collections::HashMap;

    /// Serves `handler` at the realm token path and returns the base URL.
    async fn spawn_realm(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    const TOKEN_PATH: &str = "/realms/store/protocol/openid-connect/token";

    fn client(base: &str) -> ServiceTokenClient {
        let config = KeycloakConfig::new(base, "store", "store-api").with_client_secret("s3cret");
        ServiceTokenClient::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn test_exchange_returns_access_token() {
        let router = Router::new().route(
            TOKEN_PATH,
            post(|Form(form): Form<HashMap<String, String>>| async move {
                if form.get("grant_type").map(String::as_str) == Some("client_credentials")
                    && form.get("client_secret").map(String::as_str) == Some("s3cret")
                {
                    Json(json!({"access_token": "svc-token", "expires_in": 300})).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        );
        let base = spawn_realm(router).await;

        let token = client(&base).get_service_token().await.unwrap();
        assert_eq!(token.access_token, "svc-token");
        assert_eq!(token.expires_in, Some(300));
        assert_eq!(token.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let router = Router::new().route(
            TOKEN_PATH,
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid_client") }),
        );
        let base = spawn_realm(router).await;

        let err = client(&base).get_service_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream(ref msg) if msg.contains("invalid_client")));
    }

    #[tokio::test]
    async fn test_missing_access_token_is_upstream_error() {
        let router = Router::new().route(
            TOKEN_PATH,
            post(|| async { Json(json!({"token_type": "Bearer"})) }),
        );
        let base = spawn_realm(router).await;

        let err = client(&base).get_service_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream(_)));
    }
}
