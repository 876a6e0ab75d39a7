//! 召回事件
//!
//! 事件只追加不修改。sku、batch、reason 为必填字符串，其余字段原样保存；
//! `id` 与 `timestamp` 由存储分配，调用方不得提交。

use recall_shared::document::Fields;
use recall_shared::observability::metrics;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{RecallError, Result};
use crate::models::Recall;
use crate::repository::RecallRepository;

/// 最近事件条数
pub const RECENT_RECALLS_LIMIT: usize = 10;

const REQUIRED_FIELDS: [&str; 3] = ["sku", "batch", "reason"];
const RESERVED_FIELDS: [&str; 2] = ["id", "timestamp"];

pub struct RecallService {
    recalls: RecallRepository,
}

impl RecallService {
    pub fn new(recalls: RecallRepository) -> Self {
        Self { recalls }
    }

    /// 记录召回事件，返回事件 ID
    #[instrument(skip(self, payload))]
    pub async fn log_recall(&self, payload: Fields) -> Result<String> {
        validate_payload(&payload)?;

        let id = self.recalls.append(payload).await?;
        metrics::record_recall_event();
        info!(recall_id = %id, "Recall event logged");
        Ok(id)
    }

    /// 最近的召回事件，新的在前
    #[instrument(skip(self))]
    pub async fn get_recalls(&self) -> Result<Vec<Recall>> {
        Ok(self.recalls.recent(RECENT_RECALLS_LIMIT).await?)
    }
}

fn validate_payload(payload: &Fields) -> Result<()> {
    if let Some(field) = RESERVED_FIELDS.iter().find(|f| payload.contains_key(**f)) {
        return Err(RecallError::Validation(format!("字段 {field} 由服务端生成，不能提交")));
    }

    for field in REQUIRED_FIELDS {
        match payload.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => {
                return Err(RecallError::Validation(format!("{field} 必须为非空字符串")));
            }
        }
    }
    Ok(())
}
