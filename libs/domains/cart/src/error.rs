use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_catalog::CatalogError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Missing, or in a cart that is not the caller's active cart.
    #[error("Cart item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Product is out of stock")]
    OutOfStock,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CartResult<T> = Result<T, CartError>;

impl From<DbErr> for CartError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                CartError::Validation("Referenced product does not exist".to_string())
            }
            _ => CartError::Database(err),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(_) => AppError::NotFound("Product not found".to_string()),
            CartError::ItemNotFound(_) => AppError::NotFound("Cart item not found".to_string()),
            CartError::OutOfStock => AppError::Conflict("Product is out of stock".to_string()),
            CartError::Validation(msg) => AppError::BadRequest(msg),
            CartError::Catalog(e) => e.into(),
            CartError::Database(e) => AppError::Database(e),
            CartError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
