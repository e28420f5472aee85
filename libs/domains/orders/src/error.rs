use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_cart::CartError;
use domain_catalog::CatalogError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line's product is deleted or out of stock.
    #[error("Product is no longer available: {0}")]
    Unavailable(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order or cart changed underneath the operation.
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(_) => AppError::NotFound("Order not found".to_string()),
            OrderError::EmptyCart => AppError::BadRequest("Cart is empty".to_string()),
            e @ OrderError::Unavailable(_) => AppError::Conflict(e.to_string()),
            e @ OrderError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
            OrderError::Conflict(msg) => AppError::Conflict(msg),
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::Cart(e) => e.into(),
            OrderError::Catalog(e) => e.into(),
            OrderError::Database(e) => AppError::Database(e),
            OrderError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (OrderError::OrderNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (OrderError::EmptyCart, StatusCode::BAD_REQUEST),
            (OrderError::Unavailable("Widget".into()), StatusCode::CONFLICT),
            (
                OrderError::InvalidTransition {
                    from: OrderStatus::Fulfilled,
                    to: OrderStatus::Paid,
                },
                StatusCode::BAD_REQUEST,
            ),
            (OrderError::Cart(CartError::OutOfStock), StatusCode::CONFLICT),
            (OrderError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_transition_message() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Paid,
        };
        assert_eq!(err.to_string(), "Cannot change order status from cancelled to paid");
    }
}
