use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    /// Unknown material, material/service mismatch, or a bad amount.
    #[error("{0}")]
    Validation(String),
}

pub type PricingResult<T> = Result<T, PricingError>;

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
