//! 应用状态定义
//!
//! 处理器共享的服务句柄，全部为不可变的 `Arc`，请求之间不共享可变状态。

use std::sync::Arc;

use recall_shared::config::AppConfig;
use recall_shared::document::DocumentStore;

use crate::error::{RecallError, Result};
use crate::notification::EmailService;
use crate::payment::SettlementRouter;
use crate::repository::{
    CustomerRepository, ProductRepository, PurchaseRepository, RecallRepository, RefundRepository,
};
use crate::service::{
    AffectedCustomerService, RecallService, RefundService, SeedService, StatsService,
};

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub store: Arc<dyn DocumentStore>,
    pub refund_service: Arc<RefundService>,
    pub affected_customer_service: Arc<AffectedCustomerService>,
    pub stats_service: Arc<StatsService>,
    pub recall_service: Arc<RecallService>,
    pub email_service: Arc<EmailService>,
    pub seed_service: Arc<SeedService>,
}

impl AppState {
    /// 按配置构建结算路由与邮件渠道
    pub fn build(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Result<Self> {
        let router = SettlementRouter::from_config(&config.payment)?;
        let email = EmailService::from_config(&config.email)
            .map_err(|e| RecallError::Internal(format!("邮件渠道初始化失败: {e}")))?;

        Ok(Self::with_components(
            store,
            Arc::new(router),
            Arc::new(email),
            config.stats.daily_window_days,
            &config.service_name,
        ))
    }

    /// 以给定组件组装（测试中注入替身网关和邮件渠道）
    pub fn with_components(
        store: Arc<dyn DocumentStore>,
        router: Arc<SettlementRouter>,
        email_service: Arc<EmailService>,
        daily_window_days: u32,
        service_name: &str,
    ) -> Self {
        let refunds = RefundRepository::new(store.clone());
        let purchases = PurchaseRepository::new(store.clone());
        let customers = CustomerRepository::new(store.clone());

        Self {
            service_name: service_name.to_string(),
            refund_service: Arc::new(RefundService::new(refunds.clone(), router)),
            affected_customer_service: Arc::new(AffectedCustomerService::new(
                purchases.clone(),
                customers.clone(),
            )),
            stats_service: Arc::new(StatsService::new(refunds.clone(), daily_window_days)),
            recall_service: Arc::new(RecallService::new(RecallRepository::new(store.clone()))),
            email_service,
            seed_service: Arc::new(SeedService::new(
                ProductRepository::new(store.clone()),
                customers,
                purchases,
                refunds,
            )),
            store,
        }
    }
}
