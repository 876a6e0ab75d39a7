//! 召回事件处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use recall_shared::document::Fields;
use tracing::instrument;

use crate::{
    dto::{RecallCreatedResponse, RecallListResponse},
    error::RecallError,
    state::AppState,
};

/// 记录召回事件
///
/// POST /api/logRecallEvent
///
/// 请求体为任意 JSON 对象，除必填字段外的内容原样保存。
#[instrument(skip(state, payload))]
pub async fn log_recall_event(
    State(state): State<AppState>,
    payload: Result<Json<Fields>, JsonRejection>,
) -> Result<Json<RecallCreatedResponse>, RecallError> {
    let Json(fields) = payload?;
    let id = state.recall_service.log_recall(fields).await?;
    Ok(Json(RecallCreatedResponse { id }))
}

/// GET /api/getRecalls
#[instrument(skip(state))]
pub async fn get_recalls(
    State(state): State<AppState>,
) -> Result<Json<RecallListResponse>, RecallError> {
    let recalls = state.recall_service.get_recalls().await?;
    Ok(Json(RecallListResponse { recalls }))
}
