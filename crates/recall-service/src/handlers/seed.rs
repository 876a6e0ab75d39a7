//! 样例数据处理器

use axum::{Json, extract::State};
use tracing::instrument;

use crate::{dto::SeedResponse, error::RecallError, state::AppState};

/// POST /api/seedData
#[instrument(skip(state))]
pub async fn seed_data(State(state): State<AppState>) -> Result<Json<SeedResponse>, RecallError> {
    let summary = state.seed_service.seed_sample_data().await?;
    Ok(Json(SeedResponse::new(summary)))
}
