//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that runs `Validate::validate` on the body.
///
/// Both malformed JSON and failed validation are rejected with the standard
/// error envelope.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct AddToCart {
///     product_id: Uuid,
///     #[validate(range(min = 1))]
///     quantity: i32,
/// }
///
/// async fn add(ValidatedJson(payload): ValidatedJson<AddToCart>) -> String {
///     format!("Adding {}", payload.quantity)
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
