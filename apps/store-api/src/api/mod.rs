//! Route assembly for the store API.

pub mod health;

use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use axum_helpers::authenticate;
use domain_cart::{CartService, PgCartRepository};
use domain_catalog::{CatalogService, PgProductRepository};
use domain_orders::{OrderService, PgOrderRepository};
use domain_pricing::QuoteEngine;
use std::sync::Arc;

/// Every domain router, relative to `/api`.
///
/// - `/products`, `/categories`: catalog (writes need the admin role)
/// - `/cart`: the caller's active cart
/// - `/orders`: checkout and order history
/// - `/quotes`: public manufacturing quotes
///
/// The `authenticate` layer resolves the bearer token once per request;
/// handlers decide whether a principal is required.
pub fn routes(state: &AppState) -> Router {
    let currency = state.settings.default_currency.clone();
    let products = Arc::new(PgProductRepository::new(state.db.clone()));

    let catalog = CatalogService::from_shared(products.clone());
    let cart = CartService::new(PgCartRepository::new(state.db.clone()), products)
        .with_currency(currency.clone());
    let orders = OrderService::new(PgOrderRepository::new(state.db.clone()), currency.clone());
    let quotes = QuoteEngine::new().with_currency(currency);

    Router::new()
        .merge(domain_catalog::handlers::router(catalog))
        .nest("/cart", domain_cart::handlers::router(cart))
        .nest("/orders", domain_orders::handlers::router(orders))
        .nest("/quotes", domain_pricing::handlers::router(quotes))
        .layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            authenticate,
        ))
}

/// `GET /ready`, merged at the root next to `/health`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
