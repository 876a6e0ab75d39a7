use serde::{Deserialize, Serialize};

/// 购买记录
///
/// 将客户与具体商品批次关联，召回时按 SKU + 批次定位受影响客户。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub customer_id: String,
    pub sku: String,
    pub batch: String,
    /// 购买日期（YYYY-MM-DD）
    pub date: String,
}
