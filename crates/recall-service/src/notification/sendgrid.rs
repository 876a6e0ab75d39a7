//! SendGrid 邮件渠道
//!
//! 调用 `POST /v3/mail/send`，成功时返回 202，消息 ID 位于 `x-message-id` 响应头。

use std::time::Duration;

use async_trait::async_trait;
use recall_shared::config::EmailConfig;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{EmailMessage, EmailReceipt, EmailSender, NotificationError};

pub struct SendGridEmailSender {
    base_url: String,
    api_key: Option<String>,
    from_address: String,
    bcc_address: Option<String>,
    client: reqwest::Client,
}

impl SendGridEmailSender {
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NotificationError::NotConfigured(e.to_string()))?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("SendGrid API key is not set, every send will fail until it is configured");
        }

        Ok(Self {
            base_url: config.sendgrid_base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address: config.from_address.clone(),
            bcc_address: config.bcc_address.clone().filter(|b| !b.is_empty()),
            client,
        })
    }

    /// 构造 v3 请求体
    fn build_payload(&self, message: &EmailMessage) -> Value {
        let mut personalization = json!({
            "to": [{ "email": message.to }],
        });
        // SendGrid 不允许 bcc 与 to 相同
        if let Some(bcc) = self.bcc_address.as_deref().filter(|b| *b != message.to) {
            personalization["bcc"] = json!([{ "email": bcc }]);
        }

        json!({
            "personalizations": [personalization],
            "from": { "email": self.from_address },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html }],
        })
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    fn mode(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, NotificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NotificationError::NotConfigured("缺少 SendGrid API key".to_string()))?;

        let resp = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(api_key)
            .json(&self.build_payload(message))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout
                } else {
                    NotificationError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let message_id = resp
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        info!(to = %message.to, message_id = ?message_id, "Email sent via SendGrid");

        Ok(EmailReceipt {
            message_id,
            simulated: false,
        })
    }
}
