//! 召回事件

use chrono::{DateTime, Utc};
use recall_shared::document::timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 召回事件（只追加）
///
/// 除 SKU、批次、原因外，调用方提交的其他字段原样保留在 `details` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recall {
    pub id: String,
    pub sku: String,
    pub batch: String,
    pub reason: String,
    /// 服务端写入时间
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
