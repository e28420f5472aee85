//! # Axum Helpers
//!
//! Shared HTTP plumbing for the store services.
//!
//! - **[`auth`]**: Keycloak identity bridge (token verification, principal
//!   extraction, client-credentials exchange)
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS, security headers, error envelope path
//! - **[`errors`]**: `AppError` and the `{error, status_code, path}` envelope
//! - **[`extractors`]**: UUID path and validated JSON extractors
//! - **[`audit`]**: audit log events

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AdminUser, AuthError, Authenticator, CurrentUser, KeycloakConfig, Principal,
    ServiceTokenClient, TokenVerifier, authenticate, require_admin, require_auth,
};

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator,
    close_postgres, create_app, create_production_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, error_path, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
