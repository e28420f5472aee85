use crate::errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Forbidden(String),

    /// Identity provider unreachable or returned an unusable response.
    #[error("Identity provider error: {0}")]
    Upstream(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::Unauthorized("Authentication required".to_string()),
            AuthError::InvalidToken(_) => AppError::Unauthorized("Invalid or expired token".to_string()),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::Upstream(msg) => AppError::Upstream(msg),
        }
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
