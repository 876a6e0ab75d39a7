//! 服务层输出结构
//!
//! 直接序列化为 API 响应字段（camelCase）。

use serde::Serialize;

/// 发放成功的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedRefund {
    pub refund_id: String,
    pub settlement_ref: String,
    /// 实际使用的结算网关
    #[serde(skip)]
    pub gateway: &'static str,
}

/// 受影响客户（购买记录 + 客户联系方式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedCustomer {
    pub purchase_id: String,
    pub customer_id: String,
    pub sku: String,
    pub batch: String,
    pub date: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// 受影响客户查询结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedCustomers {
    pub customers: Vec<AffectedCustomer>,
    /// 客户记录缺失的购买 ID
    pub unresolved_purchase_ids: Vec<String>,
}

/// 按星期汇总的退款金额（元）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayVolume {
    pub name: &'static str,
    pub refunds: f64,
}

/// 按日期汇总的退款金额（元）与笔数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVolume {
    /// YYYY-MM-DD
    pub date: String,
    pub refunds: f64,
    pub count: u64,
}

/// 退款统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundStats {
    /// 已发放退款总额（分）
    pub total_refunded: i64,
    pub pending_count: u64,
    pub issued_count: u64,
    pub chart_data: Vec<WeekdayVolume>,
    pub daily_data: Vec<DailyVolume>,
}

/// 样例数据写入数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub products: usize,
    pub customers: usize,
    pub purchases: usize,
    pub refunds: usize,
}
