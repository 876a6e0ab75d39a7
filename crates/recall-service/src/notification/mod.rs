//! 客户邮件通知
//!
//! ## 模块结构
//!
//! - `EmailSender`: 邮件投递渠道接口
//! - `LoggingEmailSender`: 模拟渠道，只记录日志
//! - `SendGridEmailSender`: SendGrid v3 HTTP 投递
//! - `EmailService`: 按失败策略把投递结果转换为对调用方呈现的结果

pub mod logging;
pub mod sendgrid;
pub mod service;

use async_trait::async_trait;
use thiserror::Error;

pub use logging::LoggingEmailSender;
pub use sendgrid::SendGridEmailSender;
pub use service::{EmailOutcome, EmailService};

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// 投递回执
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailReceipt {
    pub message_id: Option<String>,
    /// 模拟投递（未真正发出）
    pub simulated: bool,
}

/// 邮件投递错误
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("邮件渠道未配置: {0}")]
    NotConfigured(String),
    #[error("邮件服务请求超时")]
    Timeout,
    #[error("邮件服务拒绝请求: HTTP {status} - {message}")]
    Rejected { status: u16, message: String },
    #[error("邮件服务网络错误: {0}")]
    Network(String),
}

/// 邮件投递渠道
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 渠道名称（mock / sendgrid），用于日志和指标
    fn mode(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, NotificationError>;
}
