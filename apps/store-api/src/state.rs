//! Shared application state.

use crate::config::Settings;
use axum_helpers::Authenticator;
use database::postgres::DatabaseConnection;

/// Cloned into every router; all members are cheap `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    /// Token verifier plus the admin role name
    pub authenticator: Authenticator,
}
