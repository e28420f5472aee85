use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Catalog routes live at the API root, so they are merged rather than nested.
struct CatalogPaths;

impl Modify for CatalogPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_catalog::handlers::ApiDoc::openapi());
    }
}

/// Keycloak access tokens, sent as `Authorization: Bearer <token>`.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse, axum_helpers::ReadyResponse)
    ),
    info(
        title = "Store API",
        version = "0.1.0",
        description = "Catalog, cart, checkout and manufacturing quotes for the store"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/cart", api = domain_cart::handlers::ApiDoc),
        (path = "/orders", api = domain_orders::handlers::ApiDoc),
        (path = "/quotes", api = domain_pricing::handlers::ApiDoc)
    ),
    modifiers(&CatalogPaths, &BearerAuth)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_every_domain() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/products", "/cart/add", "/orders/checkout", "/quotes/materials"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "{expected} missing from {paths:?}"
            );
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer"))
        );
    }
}
