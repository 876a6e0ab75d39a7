//! 请求 DTO
//!
//! 请求体拒绝未知字段；缺失的字段回落到空值后由 validator 给出明确的错误信息。

use serde::Deserialize;
use validator::Validate;

use crate::error::{RecallError, Result};
use crate::models::{NewRefund, RefundStatus};
use crate::notification::EmailMessage;

/// 创建待处理退款
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CreatePendingRefundRequest {
    #[validate(length(min = 1, message = "purchaseId 不能为空"))]
    pub purchase_id: String,
    pub payment_intent_id: Option<String>,
    /// 金额（分）
    #[validate(range(min = 1, max = 99_999_999, message = "amount 必须为 1 到 99999999 之间的整数（分）"))]
    pub amount: i64,
    #[validate(length(min = 1, message = "customerId 不能为空"))]
    pub customer_id: String,
}

impl From<CreatePendingRefundRequest> for NewRefund {
    fn from(req: CreatePendingRefundRequest) -> Self {
        Self {
            purchase_id: req.purchase_id,
            payment_intent_id: req.payment_intent_id.filter(|pi| !pi.is_empty()),
            amount: req.amount,
            customer_id: req.customer_id,
        }
    }
}

/// 按退款 ID 操作（发放、查询状态），支持请求体与查询参数
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RefundIdRequest {
    #[validate(length(min = 1, message = "缺少 refundId"))]
    pub refund_id: String,
}

/// 退款列表过滤
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListRefundsQuery {
    pub status: Option<String>,
}

impl ListRefundsQuery {
    /// 解析状态过滤，空字符串视为不过滤
    pub fn status_filter(&self) -> Result<Option<RefundStatus>> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(RecallError::Validation),
        }
    }
}

/// 受影响客户查询
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct AffectedCustomersRequest {
    #[validate(length(min = 1, message = "缺少 sku"))]
    pub sku: String,
    #[validate(length(min = 1, message = "缺少 batch"))]
    pub batch: String,
}

/// 发送邮件
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SendEmailRequest {
    #[validate(email(message = "收件地址格式不正确"))]
    pub to: String,
    #[validate(length(min = 1, max = 998, message = "邮件主题不能为空且不超过998字符"))]
    pub subject: String,
    pub html: String,
}

impl From<SendEmailRequest> for EmailMessage {
    fn from(req: SendEmailRequest) -> Self {
        Self {
            to: req.to,
            subject: req.subject,
            html: req.html,
        }
    }
}
