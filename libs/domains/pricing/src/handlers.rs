use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::engine::QuoteEngine;
use crate::error::PricingResult;
use crate::materials::Material;
use crate::models::{Quality, Quote, QuoteRequest, ServiceKind};

pub const TAG: &str = "quotes";

#[derive(OpenApi)]
#[openapi(
    paths(create_quote, list_materials),
    components(
        schemas(Quote, QuoteRequest, Quality, ServiceKind, Material),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = TAG, description = "Manufacturing price quotes"))
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialQuery {
    /// Only materials for this service.
    pub service: Option<ServiceKind>,
}

/// Routes relative to the quotes mount point (`/quotes`).
pub fn router(engine: QuoteEngine) -> Router {
    Router::new()
        .route("/", post(create_quote))
        .route("/materials", get(list_materials))
        .with_state(Arc::new(engine))
}

/// Quote a manufacturing job
#[utoipa::path(
    post,
    path = "/",
    tag = TAG,
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Price breakdown", body = Quote),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_quote(
    State(engine): State<Arc<QuoteEngine>>,
    ValidatedJson(request): ValidatedJson<QuoteRequest>,
) -> PricingResult<Json<Quote>> {
    Ok(Json(engine.quote(&request)?))
}

/// List quotable materials
#[utoipa::path(
    get,
    path = "/materials",
    tag = TAG,
    params(MaterialQuery),
    responses(
        (status = 200, description = "Materials ordered by id", body = Vec<Material>)
    )
)]
async fn list_materials(
    State(engine): State<Arc<QuoteEngine>>,
    Query(query): Query<MaterialQuery>,
) -> Json<Vec<Material>> {
    Json(engine.materials(query.service))
}
