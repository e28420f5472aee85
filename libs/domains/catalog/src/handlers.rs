use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AdminUser, AuditEvent, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::CatalogService;

pub const TAG: &str = "catalog";

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        list_categories,
        create_category,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, Category, CreateCategory),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Products and categories"))
)]
pub struct ApiDoc;

/// Routes relative to the API root: `/products…` and `/categories`.
pub fn router<R: ProductRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{slug}", get(get_product).put(update_product))
        .route("/categories", get(list_categories).post(create_category))
        .with_state(shared_service)
}

/// List products
#[utoipa::path(
    get,
    path = "/products",
    tag = TAG,
    params(ProductFilter),
    responses(
        (status = 200, description = "Products, newest first", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(filter): Query<ProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    Ok(Json(service.list_products(filter).await?))
}

/// Get a product by slug
#[utoipa::path(
    get,
    path = "/products/{slug}",
    tag = TAG,
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(slug): Path<String>,
) -> CatalogResult<Json<Product>> {
    Ok(Json(service.get_product_by_slug(&slug).await?))
}

/// Create a product (admin)
#[utoipa::path(
    post,
    path = "/products",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(input).await?;

    AuditEvent::for_principal(&admin, "product.create", format!("product:{}", product.id))
        .with_request(&headers)
        .with_details(json!({
            "slug": product.slug,
            "sku": product.sku,
            "price": product.price,
        }))
        .log();

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin)
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    AdminUser(admin): AdminUser,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<Product>> {
    let changes = serde_json::to_value(&input).unwrap_or_default();
    let product = service.update_product(id, input).await?;

    AuditEvent::for_principal(&admin, "product.update", format!("product:{}", id))
        .with_request(&headers)
        .with_details(changes)
        .log();

    Ok(Json(product))
}

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = TAG,
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Category>>> {
    Ok(Json(service.list_categories().await?))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "/categories",
    tag = TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn create_category<R: ProductRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;

    AuditEvent::for_principal(&admin, "category.create", format!("category:{}", category.id))
        .with_request(&headers)
        .with_details(json!({ "slug": category.slug }))
        .log();

    Ok((StatusCode::CREATED, Json(category)))
}
