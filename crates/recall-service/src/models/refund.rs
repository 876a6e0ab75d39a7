//! 退款实体
//!
//! 退款只有两种状态：待处理与已发放。已发放状态携带发放时间与结算凭证，
//! 二者以枚举变体承载，不存在"已发放但没有结算凭证"的中间形态。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use recall_shared::document::timestamp;
use serde::{Deserialize, Serialize};

/// 退款状态（用于过滤和响应）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Issued,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Issued => "issued",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "issued" => Ok(Self::Issued),
            other => Err(format!("未知的退款状态: {}", other)),
        }
    }
}

/// 退款生命周期状态
///
/// 序列化为文档中的 `status` 字段，已发放时附带 `issuedAt` 与 `settlementRef`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum RefundState {
    Pending,
    Issued {
        #[serde(with = "timestamp")]
        issued_at: DateTime<Utc>,
        settlement_ref: String,
    },
}

/// 退款记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub id: String,
    pub purchase_id: String,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    /// 金额（分）
    pub amount: i64,
    pub customer_id: String,
    /// 服务端创建时间，历史数据可能缺失
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub state: RefundState,
}

impl Refund {
    pub fn status(&self) -> RefundStatus {
        match self.state {
            RefundState::Pending => RefundStatus::Pending,
            RefundState::Issued { .. } => RefundStatus::Issued,
        }
    }

    pub fn is_issued(&self) -> bool {
        matches!(self.state, RefundState::Issued { .. })
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            RefundState::Issued { issued_at, .. } => Some(*issued_at),
            RefundState::Pending => None,
        }
    }

    pub fn settlement_ref(&self) -> Option<&str> {
        match &self.state {
            RefundState::Issued { settlement_ref, .. } => Some(settlement_ref),
            RefundState::Pending => None,
        }
    }
}

/// 单笔退款金额上限（分）
pub const MAX_REFUND_AMOUNT: i64 = 99_999_999;

/// 新建待处理退款的输入
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRefund {
    pub purchase_id: String,
    pub payment_intent_id: Option<String>,
    pub amount: i64,
    pub customer_id: String,
}
