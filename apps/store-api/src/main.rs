use axum_helpers::{
    Authenticator, close_postgres, create_production_app, create_router, health_router,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::{info, warn};

mod api;
mod config;
mod identity;
mod openapi;
mod state;

use config::Settings;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    // Parse errors abort here; missing values are judged by validate()
    let settings = Settings::load()?;
    init_tracing(&settings.environment);

    let report = settings.validate()?;
    if !report.missing_secrets.is_empty() {
        warn!(
            missing = ?report.missing_secrets,
            "Starting with missing secrets outside production"
        );
    }
    match &settings.redis_url {
        Some(_) => info!("REDIS_URL configured"),
        None => info!("REDIS_URL not configured"),
    }

    let db = database::postgres::connect_from_config_with_retry(&settings.database)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db, settings.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let http = reqwest::Client::new();
    let verifier = identity::token_verifier(&settings, &http).await?;
    let authenticator = Authenticator::new(verifier, settings.keycloak.admin_role.as_str());

    let state = AppState {
        settings: settings.clone(),
        db: db.clone(),
        authenticator,
    };

    let api_routes = api::routes(&state);
    let app = create_router::<openapi::ApiDoc>(api_routes, &settings.cors_origins)
        .merge(health_router(settings.app))
        .merge(api::ready_router(state));

    info!(
        environment = %settings.environment,
        currency = %settings.default_currency,
        "Starting {} v{}",
        settings.app.name,
        settings.app.version
    );

    create_production_app(app, &settings.server, async move {
        close_postgres(db, "main").await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}
