//! 受影响客户查询处理器

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use tracing::instrument;
use validator::Validate;

use crate::{
    dto::AffectedCustomersRequest, error::RecallError, service::dto::AffectedCustomers,
    state::AppState,
};

/// GET /api/findAffectedCustomers?sku=&batch=
#[instrument(skip(state, params))]
pub async fn find_affected_customers_query(
    State(state): State<AppState>,
    params: Result<Query<AffectedCustomersRequest>, QueryRejection>,
) -> Result<Json<AffectedCustomers>, RecallError> {
    let Query(req) = params?;
    find_affected_customers(&state, req).await
}

/// POST /api/findAffectedCustomers
#[instrument(skip(state, payload))]
pub async fn find_affected_customers_body(
    State(state): State<AppState>,
    payload: Result<Json<AffectedCustomersRequest>, JsonRejection>,
) -> Result<Json<AffectedCustomers>, RecallError> {
    let Json(req) = payload?;
    find_affected_customers(&state, req).await
}

async fn find_affected_customers(
    state: &AppState,
    req: AffectedCustomersRequest,
) -> Result<Json<AffectedCustomers>, RecallError> {
    req.validate()?;
    let result = state
        .affected_customer_service
        .find_affected_customers(&req.sku, &req.batch)
        .await?;
    Ok(Json(result))
}
