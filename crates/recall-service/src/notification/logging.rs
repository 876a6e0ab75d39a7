use async_trait::async_trait;
use tracing::info;

use super::{EmailMessage, EmailReceipt, EmailSender, NotificationError};

/// 模拟邮件渠道：不发出任何请求，仅记录日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    fn mode(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, NotificationError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            html_len = message.html.len(),
            "模拟发送邮件"
        );

        Ok(EmailReceipt {
            message_id: None,
            simulated: true,
        })
    }
}
