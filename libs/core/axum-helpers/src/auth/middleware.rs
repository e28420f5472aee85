use super::error::AuthError;
use super::principal::Principal;
use super::verifier::TokenVerifier;
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Role name that grants admin access, stored in request extensions by
/// [`authenticate`].
#[derive(Clone, Debug)]
pub struct AdminRole(pub Arc<str>);

/// State for the [`authenticate`] middleware.
#[derive(Clone)]
pub struct Authenticator {
    pub verifier: TokenVerifier,
    pub admin_role: Arc<str>,
}

impl Authenticator {
    pub fn new(verifier: TokenVerifier, admin_role: impl Into<Arc<str>>) -> Self {
        Self {
            verifier,
            admin_role: admin_role.into(),
        }
    }
}

/// Extract the token from `Authorization: Bearer` or the `access_token` cookie.
pub(crate) fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .split_once('=')
                            .filter(|(name, _)| *name == "access_token")
                            .map(|(_, value)| value.to_string())
                    })
                })
        })
        .filter(|t| !t.is_empty())
}

/// Resolves the caller's [`Principal`] and stores it in request extensions.
///
/// Never rejects: a missing or invalid token simply leaves no principal, and
/// the protected handlers answer 401 through [`CurrentUser`] / [`AdminUser`].
pub async fn authenticate(
    State(auth): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    request
        .extensions_mut()
        .insert(AdminRole(auth.admin_role.clone()));

    if let Some(token) = extract_token_from_request(request.headers()) {
        match auth.verifier.verify(&token).await {
            Ok(principal) => {
                tracing::debug!(user_id = %principal.user_id, "Request authenticated");
                request.extensions_mut().insert(principal);
            }
            Err(e) => tracing::debug!("Token rejected: {}", e),
        }
    }

    next.run(request).await
}

pub fn require_auth(parts: &Parts) -> Result<Principal, AuthError> {
    parts
        .extensions
        .get::<Principal>()
        .cloned()
        .ok_or(AuthError::MissingToken)
}

/// 401 without a principal, 403 when the principal lacks `admin_role`.
pub fn require_admin(parts: &Parts, admin_role: &str) -> Result<Principal, AuthError> {
    let principal = require_auth(parts)?;
    if principal.has_role(admin_role) {
        Ok(principal)
    } else {
        tracing::info!(user_id = %principal.user_id, role = admin_role, "Admin role missing");
        Err(AuthError::Forbidden("Admin role required".to_string()))
    }
}

/// Any authenticated caller.
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(require_auth(parts)?))
    }
}

/// Authenticated caller holding the configured admin role.
pub struct AdminUser(pub Principal);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .extensions
            .get::<AdminRole>()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| Arc::from("admin"));
        Ok(AdminUser(require_admin(parts, &role)?))
    }
}
