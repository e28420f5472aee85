//! Identity bridge to the Keycloak realm.
//!
//! - [`TokenVerifier`] validates bearer tokens (realm JWKS or a shared HS256
//!   secret) into a [`Principal`].
//! - [`authenticate`] middleware stores the principal in request extensions.
//! - [`CurrentUser`] / [`AdminUser`] extractors enforce 401 / 403.
//! - [`ServiceTokenClient`] performs the client-credentials exchange.
//!
//! ```ignore
//! let verifier = TokenVerifier::from_config(&keycloak, &http).await?;
//! let auth = Authenticator::new(verifier, keycloak.admin_role.clone());
//!
//! let app = Router::new()
//!     .route("/api/cart", get(get_cart))
//!     .layer(axum::middleware::from_fn_with_state(auth, authenticate));
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod principal;
pub mod service_token;
pub mod verifier;

pub use config::KeycloakConfig;
pub use error::{AuthError, AuthResult};
pub use middleware::{
    AdminRole, AdminUser, Authenticator, CurrentUser, authenticate, require_admin, require_auth,
};
pub use principal::{KeycloakClaims, Principal, RoleClaim};
pub use service_token::{ServiceToken, ServiceTokenClient};
pub use verifier::TokenVerifier;
