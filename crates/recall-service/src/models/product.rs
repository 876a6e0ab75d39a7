use serde::{Deserialize, Serialize};

/// 商品，文档 ID 即 SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub supplier: String,
    /// 单价（分）
    pub price: i64,
}
