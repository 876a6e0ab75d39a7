//! 统计报表处理器

use axum::{Json, extract::State};
use tracing::instrument;

use crate::{error::RecallError, service::dto::RefundStats, state::AppState};

/// GET /api/getStats
#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<RefundStats>, RecallError> {
    Ok(Json(state.stats_service.get_stats().await?))
}
