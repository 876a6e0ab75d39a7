//! 召回服务错误类型定义
//!
//! 统一映射为 HTTP 状态码与 `{error, code}` 响应体。

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use recall_shared::error::StoreError;
use serde_json::json;

use crate::payment::PaymentError;

/// 召回服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    // 请求错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("不支持的请求方法: {0}")]
    MethodNotAllowed(String),

    // 资源不存在
    #[error("退款不存在: {0}")]
    RefundNotFound(String),

    // 业务冲突
    #[error("退款已发放: {refund_id}")]
    AlreadyIssued {
        refund_id: String,
        settlement_ref: String,
    },

    // 外部依赖
    #[error("支付网关错误: {0}")]
    Payment(#[from] PaymentError),

    // 系统错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl RecallError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::RefundNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyIssued { .. } => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::RefundNotFound(_) => "REFUND_NOT_FOUND",
            Self::AlreadyIssued { .. } => "ALREADY_ISSUED",
            Self::Payment(_) => "PAYMENT_GATEWAY_ERROR",
            Self::Store(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for RecallError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部工具：系统错误原样返回消息便于排查，同时记录日志
        match &self {
            Self::Store(e) => tracing::error!(error = %e, "存储操作失败"),
            Self::Internal(e) => tracing::error!(error = %e, "内部错误"),
            Self::Payment(e) => tracing::error!(error = %e, "支付网关调用失败"),
            _ => {}
        }

        let mut body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        if let Self::AlreadyIssued { settlement_ref, .. } = &self {
            body["settlementRef"] = json!(settlement_ref);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for RecallError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析（格式错误、缺少 Content-Type、未知字段等）
impl From<JsonRejection> for RecallError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for RecallError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, RecallError>;
