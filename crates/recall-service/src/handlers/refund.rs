//! 退款 API 处理器

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
    dto::{
        CreatePendingRefundRequest, CreatedRefundResponse, IssueRefundResponse, ListRefundsQuery,
        RefundIdRequest, RefundListResponse, RefundStatusResponse,
    },
    error::RecallError,
    state::AppState,
};

/// 创建待处理退款
///
/// POST /api/createPendingRefund
#[instrument(skip(state, payload))]
pub async fn create_pending_refund(
    State(state): State<AppState>,
    payload: Result<Json<CreatePendingRefundRequest>, JsonRejection>,
) -> Result<Json<CreatedRefundResponse>, RecallError> {
    let Json(req) = payload?;
    req.validate()?;

    let refund_id = state.refund_service.create_pending_refund(req.into()).await?;
    Ok(Json(CreatedRefundResponse { refund_id }))
}

/// 发放退款
///
/// POST /api/issueRefund
///
/// 已发放的退款返回 409，并附带已有的结算凭证。
#[instrument(skip(state, payload))]
pub async fn issue_refund(
    State(state): State<AppState>,
    payload: Result<Json<RefundIdRequest>, JsonRejection>,
) -> Result<Json<IssueRefundResponse>, RecallError> {
    let Json(req) = payload?;
    req.validate()?;

    let issued = state.refund_service.issue_refund(&req.refund_id).await?;
    Ok(Json(issued.into()))
}

/// 查询退款状态（查询参数）
///
/// GET /api/checkRefundStatus?refundId=
#[instrument(skip(state, params))]
pub async fn check_refund_status_query(
    State(state): State<AppState>,
    params: Result<Query<RefundIdRequest>, QueryRejection>,
) -> Result<Json<RefundStatusResponse>, RecallError> {
    let Query(req) = params?;
    check_refund_status(&state, req).await
}

/// 查询退款状态（请求体）
///
/// POST /api/checkRefundStatus
#[instrument(skip(state, payload))]
pub async fn check_refund_status_body(
    State(state): State<AppState>,
    payload: Result<Json<RefundIdRequest>, JsonRejection>,
) -> Result<Json<RefundStatusResponse>, RecallError> {
    let Json(req) = payload?;
    check_refund_status(&state, req).await
}

async fn check_refund_status(
    state: &AppState,
    req: RefundIdRequest,
) -> Result<Json<RefundStatusResponse>, RecallError> {
    req.validate()?;
    let refund = state.refund_service.get_refund_status(&req.refund_id).await?;
    Ok(Json(refund.into()))
}

/// 退款列表
///
/// GET /api/getRefunds?status=
#[instrument(skip(state, params))]
pub async fn list_refunds(
    State(state): State<AppState>,
    params: Result<Query<ListRefundsQuery>, QueryRejection>,
) -> Result<Json<RefundListResponse>, RecallError> {
    let Query(query) = params?;
    let refunds = state
        .refund_service
        .list_refunds(query.status_filter()?)
        .await?;
    Ok(Json(RefundListResponse { refunds }))
}
