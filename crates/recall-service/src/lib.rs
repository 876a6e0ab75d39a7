//! 召回管理服务
//!
//! 产品召回、客户退款与统计报表的 HTTP 后端。处理器无状态，
//! 所有数据经 `DocumentStore` 读写；支付结算与邮件为外部协作方，默认均为模拟实现。
//!
//! ## 模块结构
//!
//! - `models`: 领域实体（退款、购买、客户、商品、召回事件）
//! - `repository`: 按实体划分的文档存储读写
//! - `service`: 退款流程、受影响客户、统计、召回、样例数据
//! - `payment`: 结算网关与路由
//! - `notification`: 邮件渠道与失败策略
//! - `handlers` / `routes`: axum HTTP 层

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notification;
pub mod payment;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{RecallError, Result};
pub use routes::{build_router, cors_layer};
pub use state::AppState;
