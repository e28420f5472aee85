//! Server bootstrap: router assembly, health endpoints, graceful shutdown.
//!
//! ```ignore
//! let router = create_router::<ApiDoc>(api_routes, &settings.cors_origins)
//!     .merge(health_router(app_info!()));
//!
//! create_production_app(router, &settings.server, async move {
//!     close_postgres(db, "main").await;
//! })
//! .await?;
//! ```

pub mod app;
pub mod cleanup;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use cleanup::{CleanupCoordinator, close_postgres};
pub use health::{
    HealthCheckFuture, HealthResponse, ReadyResponse, health_router, run_health_checks,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
