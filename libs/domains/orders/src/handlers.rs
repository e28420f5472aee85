use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AdminUser, AuditEvent, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    CheckoutRequest, Order, OrderDetail, OrderFilter, OrderItem, OrderStatus, UpdateOrderStatus,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

pub const TAG: &str = "orders";

#[derive(OpenApi)]
#[openapi(
    paths(list_orders, checkout, get_order, update_status),
    components(
        schemas(Order, OrderItem, OrderDetail, OrderStatus, CheckoutRequest, UpdateOrderStatus),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Checkout and order history"))
)]
pub struct ApiDoc;

/// Routes relative to the orders mount point (`/orders`).
pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_status))
        .with_state(Arc::new(service))
}

/// List the caller's orders
#[utoipa::path(
    get,
    path = "/",
    tag = TAG,
    params(OrderFilter),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> OrderResult<Json<Vec<Order>>> {
    Ok(Json(service.list_orders(&user.user_id, filter).await?))
}

/// Turn the active cart into an order
#[utoipa::path(
    post,
    path = "/checkout",
    tag = TAG,
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderDetail),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn checkout<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CheckoutRequest>,
) -> OrderResult<impl IntoResponse> {
    let detail = service.checkout(&user.user_id, input).await?;

    AuditEvent::for_principal(&user, "order.checkout", format!("order:{}", detail.order.id))
        .with_request(&headers)
        .with_details(json!({
            "order_number": detail.order.order_number,
            "total_amount": detail.order.total_amount,
            "currency": detail.order.currency,
            "items": detail.items.len(),
        }))
        .log();

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Get one of the caller's orders
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its lines", body = OrderDetail),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    CurrentUser(user): CurrentUser,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<OrderDetail>> {
    Ok(Json(service.get_order(&user.user_id, id).await?))
}

/// Change an order's status (admin)
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn update_status<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    AdminUser(admin): AdminUser,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<UpdateOrderStatus>,
) -> OrderResult<Json<Order>> {
    let order = service.update_status(id, input).await?;

    AuditEvent::for_principal(&admin, "order.status", format!("order:{}", id))
        .with_request(&headers)
        .with_details(json!({ "status": order.status }))
        .log();

    Ok(Json(order))
}
