use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use axum_helpers::{
    CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_catalog::ProductRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CartResult;
use crate::models::{
    AddToCart, Cart, CartItemResponse, CartItemSummary, CartLine, CartProduct, CartResponse,
    CartStatus, CartSummary, MessageResponse, UpdateCartItem,
};
use crate::repository::CartRepository;
use crate::service::CartService;

pub const TAG: &str = "cart";

#[derive(OpenApi)]
#[openapi(
    paths(get_cart, clear_cart, add_to_cart, update_item, remove_item),
    components(
        schemas(
            Cart,
            CartStatus,
            CartLine,
            CartProduct,
            CartSummary,
            CartResponse,
            AddToCart,
            UpdateCartItem,
            CartItemSummary,
            CartItemResponse,
            MessageResponse
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "The caller's shopping cart"))
)]
pub struct ApiDoc;

type SharedService<C, P> = Arc<CartService<C, P>>;

/// Routes relative to the cart mount point (`/cart`). Every route needs an
/// authenticated caller.
pub fn router<C, P>(service: CartService<C, P>) -> Router
where
    C: CartRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/add", post(add_to_cart))
        .route("/item/{item_id}", put(update_item).delete(remove_item))
        .with_state(Arc::new(service))
}

/// Get the active cart
#[utoipa::path(
    get,
    path = "/",
    tag = TAG,
    responses(
        (status = 200, description = "Active cart with totals; empty when there is none", body = CartResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn get_cart<C: CartRepository, P: ProductRepository>(
    State(service): State<SharedService<C, P>>,
    CurrentUser(user): CurrentUser,
) -> CartResult<Json<CartResponse>> {
    let view = service.get_cart(&user.user_id).await?;
    Ok(Json(CartResponse::new(view, service.currency())))
}

/// Remove every line from the active cart
#[utoipa::path(
    delete,
    path = "/",
    tag = TAG,
    responses(
        (status = 200, description = "Cart cleared", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn clear_cart<C: CartRepository, P: ProductRepository>(
    State(service): State<SharedService<C, P>>,
    CurrentUser(user): CurrentUser,
) -> CartResult<Json<MessageResponse>> {
    service.clear(&user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Cart cleared".to_string(),
        success: true,
    }))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/add",
    tag = TAG,
    request_body = AddToCart,
    responses(
        (status = 200, description = "Line added or incremented", body = CartItemResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn add_to_cart<C: CartRepository, P: ProductRepository>(
    State(service): State<SharedService<C, P>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(input): ValidatedJson<AddToCart>,
) -> CartResult<Json<CartItemResponse>> {
    let item = service.add_item(&user.user_id, input).await?;
    Ok(Json(CartItemResponse {
        message: "Item added to cart".to_string(),
        success: true,
        cart_item: item.into(),
    }))
}

/// Change a line's quantity
#[utoipa::path(
    put,
    path = "/item/{item_id}",
    tag = TAG,
    params(("item_id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Line updated", body = CartItemResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn update_item<C: CartRepository, P: ProductRepository>(
    State(service): State<SharedService<C, P>>,
    CurrentUser(user): CurrentUser,
    UuidPath(item_id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCartItem>,
) -> CartResult<Json<CartItemResponse>> {
    let item = service.update_item(&user.user_id, item_id, input).await?;
    Ok(Json(CartItemResponse {
        message: "Cart item updated".to_string(),
        success: true,
        cart_item: item.into(),
    }))
}

/// Remove a line from the cart
#[utoipa::path(
    delete,
    path = "/item/{item_id}",
    tag = TAG,
    params(("item_id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Line removed", body = MessageResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn remove_item<C: CartRepository, P: ProductRepository>(
    State(service): State<SharedService<C, P>>,
    CurrentUser(user): CurrentUser,
    UuidPath(item_id): UuidPath,
) -> CartResult<Json<MessageResponse>> {
    service.remove_item(&user.user_id, item_id).await?;
    Ok(Json(MessageResponse {
        message: "Item removed from cart".to_string(),
        success: true,
    }))
}
