use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Slug or SKU already taken.
    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                CatalogError::Duplicate(duplicate_message(&detail))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                CatalogError::Validation("Referenced category does not exist".to_string())
            }
            _ => CatalogError::Database(err),
        }
    }
}

fn duplicate_message(detail: &str) -> String {
    if detail.contains("sku") {
        "A product with this SKU already exists".to_string()
    } else {
        "A record with this slug already exists".to_string()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(key) => {
                AppError::NotFound(format!("Product {} not found", key))
            }
            CatalogError::CategoryNotFound(key) => {
                AppError::NotFound(format!("Category {} not found", key))
            }
            CatalogError::Duplicate(msg) => AppError::Conflict(msg),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
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
            (CatalogError::ProductNotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::Duplicate("dup".into()), StatusCode::CONFLICT),
            (CatalogError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (CatalogError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_plain_db_error_stays_internal() {
        let err = CatalogError::from(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, CatalogError::Database(_)));
    }
}
