//! 邮件发送处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;
use validator::Validate;

use crate::{
    dto::{EmailResponse, SendEmailRequest},
    error::RecallError,
    state::AppState,
};

/// 发送邮件
///
/// POST /api/sendEmail
///
/// 投递结果不映射为 HTTP 错误：失败时按策略返回 `ok: false` 或伪装成功。
#[instrument(skip(state, payload))]
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, RecallError> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state.email_service.send(&req.into()).await;
    Ok(Json(outcome.into()))
}
