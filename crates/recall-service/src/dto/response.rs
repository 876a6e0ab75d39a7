//! 响应 DTO

use chrono::{DateTime, Utc};
use recall_shared::document::timestamp;
use serde::Serialize;

use crate::models::{Recall, Refund, RefundStatus};
use crate::notification::EmailOutcome;
use crate::service::dto::{IssuedRefund, SeedSummary};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRefundResponse {
    pub refund_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRefundResponse {
    pub ok: bool,
    pub refund_id: String,
    pub settlement_ref: String,
    pub status: RefundStatus,
}

impl From<IssuedRefund> for IssueRefundResponse {
    fn from(issued: IssuedRefund) -> Self {
        Self {
            ok: true,
            refund_id: issued.refund_id,
            settlement_ref: issued.settlement_ref,
            status: RefundStatus::Issued,
        }
    }
}

/// 单笔退款状态
///
/// 缺少创建时间的历史记录返回 `createdAt: null`；未发放时不含发放字段。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundStatusResponse {
    pub refund_id: String,
    pub status: RefundStatus,
    pub amount: i64,
    #[serde(with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_ref: Option<String>,
}

impl From<Refund> for RefundStatusResponse {
    fn from(refund: Refund) -> Self {
        Self {
            status: refund.status(),
            issued_at: refund.issued_at(),
            settlement_ref: refund.settlement_ref().map(String::from),
            refund_id: refund.id,
            amount: refund.amount,
            created_at: refund.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefundListResponse {
    pub refunds: Vec<Refund>,
}

#[derive(Debug, Serialize)]
pub struct RecallCreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct RecallListResponse {
    pub recalls: Vec<Recall>,
}

/// 邮件发送响应（始终 HTTP 200）
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl From<EmailOutcome> for EmailResponse {
    fn from(outcome: EmailOutcome) -> Self {
        let ok = outcome.is_ok();
        match outcome {
            EmailOutcome::Sent { message_id } => Self {
                ok,
                message_id,
                ..Default::default()
            },
            EmailOutcome::Mocked { note } => Self {
                ok,
                note: Some(note),
                ..Default::default()
            },
            EmailOutcome::Failed { error } => Self {
                ok,
                error: Some(error),
                ..Default::default()
            },
            EmailOutcome::Masked { note, real_error } => Self {
                ok,
                note: Some(note),
                real_error: Some(real_error),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub data: SeedSummary,
}

impl SeedResponse {
    pub fn new(data: SeedSummary) -> Self {
        Self {
            message: "Sample data seeded successfully!".to_string(),
            data,
        }
    }
}
