//! HTTP 请求处理器
//!
//! 每个端点只接受声明的方法；OPTIONS 统一返回 200 空响应，其余方法返回 405。

pub mod customer;
pub mod email;
pub mod health;
pub mod recall;
pub mod refund;
pub mod seed;
pub mod stats;

use axum::http::{Method, StatusCode};

use crate::error::RecallError;

/// OPTIONS 请求
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// 未声明的方法
pub async fn method_not_allowed(method: Method) -> RecallError {
    RecallError::MethodNotAllowed(method.to_string())
}
