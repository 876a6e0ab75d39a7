//! 业务服务层
//!
//! 处理器只做请求解析与响应组装，业务规则集中在这里：
//!
//! - `RefundService`: 退款创建、发放（条件更新）与查询
//! - `AffectedCustomerService`: 按 SKU + 批次定位受影响客户
//! - `StatsService`: 退款统计聚合
//! - `RecallService`: 召回事件记录与最近事件查询
//! - `SeedService`: 写入演示用样例数据

pub mod affected_customers;
pub mod dto;
pub mod recall_service;
pub mod refund_service;
pub mod seed_service;
pub mod stats_service;

pub use affected_customers::AffectedCustomerService;
pub use recall_service::RecallService;
pub use refund_service::RefundService;
pub use seed_service::SeedService;
pub use stats_service::StatsService;
