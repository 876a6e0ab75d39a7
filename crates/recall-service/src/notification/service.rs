//! 邮件服务
//!
//! 投递失败不会转换为 HTTP 错误；按 `EmailFailurePolicy` 决定如实上报还是对调用方伪装成功。

use std::sync::Arc;

use recall_shared::config::{EmailConfig, EmailFailurePolicy, EmailMode};
use recall_shared::observability::metrics;
use tracing::{error, instrument, warn};

use super::{EmailMessage, EmailSender, LoggingEmailSender, NotificationError, SendGridEmailSender};

pub const MOCK_NOTE: &str = "Mock email sent (no real email dispatched)";
pub const MASKED_NOTE: &str = "Email failed but success was reported to the caller";

/// 邮件发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    /// 已投递
    Sent { message_id: Option<String> },
    /// 模拟渠道，未真正发出
    Mocked { note: String },
    /// 投递失败（report 策略）
    Failed { error: String },
    /// 投递失败但对调用方呈现为成功（mask 策略）
    Masked { note: String, real_error: String },
}

impl EmailOutcome {
    /// 调用方看到的 ok 标志
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "sent",
            Self::Mocked { .. } => "mocked",
            Self::Failed { .. } => "failed",
            Self::Masked { .. } => "masked",
        }
    }
}

pub struct EmailService {
    sender: Arc<dyn EmailSender>,
    policy: EmailFailurePolicy,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>, policy: EmailFailurePolicy) -> Self {
        Self { sender, policy }
    }

    /// 按配置选择渠道
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotificationError> {
        let sender: Arc<dyn EmailSender> = match config.mode {
            EmailMode::Mock => Arc::new(LoggingEmailSender),
            EmailMode::SendGrid => Arc::new(SendGridEmailSender::from_config(config)?),
        };
        Ok(Self::new(sender, config.failure_policy))
    }

    pub fn mode(&self) -> &'static str {
        self.sender.mode()
    }

    #[instrument(skip(self, message), fields(to = %message.to, mode = self.sender.mode()))]
    pub async fn send(&self, message: &EmailMessage) -> EmailOutcome {
        let outcome = match self.sender.send(message).await {
            Ok(receipt) if receipt.simulated => EmailOutcome::Mocked {
                note: MOCK_NOTE.to_string(),
            },
            Ok(receipt) => EmailOutcome::Sent {
                message_id: receipt.message_id,
            },
            Err(e) => match self.policy {
                EmailFailurePolicy::Report => {
                    error!(error = %e, "Email delivery failed");
                    EmailOutcome::Failed {
                        error: e.to_string(),
                    }
                }
                EmailFailurePolicy::Mask => {
                    warn!(error = %e, "Email delivery failed, masking as success");
                    EmailOutcome::Masked {
                        note: MASKED_NOTE.to_string(),
                        real_error: e.to_string(),
                    }
                }
            },
        };

        metrics::record_email(self.sender.mode(), outcome.label());
        outcome
    }
}
