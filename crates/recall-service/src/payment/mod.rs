//! 退款结算网关
//!
//! 结算请求以退款 ID 作为幂等键发往网关。`SettlementRouter` 按支付凭证选择网关：
//! 测试凭证（默认前缀 `pi_mock`）或未开启真实退款时一律走模拟网关。

pub mod simulated;
pub mod stripe;

use std::sync::Arc;

use async_trait::async_trait;
use recall_shared::config::PaymentConfig;
use thiserror::Error;
use tracing::{info, warn};

pub use simulated::SimulatedGateway;
pub use stripe::StripeGateway;

/// 结算请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    /// 退款 ID，同时作为幂等键
    pub refund_id: String,
    pub payment_intent_id: Option<String>,
    /// 金额（分）
    pub amount: i64,
}

/// 结算结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub settlement_ref: String,
    pub gateway: &'static str,
}

/// 支付网关错误
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("支付网关未配置: {0}")]
    NotConfigured(String),
    #[error("支付网关请求超时")]
    Timeout,
    #[error("支付网关拒绝退款: HTTP {status} - {message}")]
    Rejected { status: u16, message: String },
    #[error("支付网关网络错误: {0}")]
    Network(String),
    #[error("支付网关响应无效: {0}")]
    InvalidResponse(String),
}

/// 结算网关接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn refund(&self, request: &SettlementRequest) -> Result<Settlement, PaymentError>;
}

/// 结算路由
pub struct SettlementRouter {
    simulated: Arc<dyn SettlementGateway>,
    live: Option<Arc<dyn SettlementGateway>>,
    test_reference_prefix: String,
}

impl SettlementRouter {
    pub fn new(
        simulated: Arc<dyn SettlementGateway>,
        live: Option<Arc<dyn SettlementGateway>>,
        test_reference_prefix: impl Into<String>,
    ) -> Self {
        Self {
            simulated,
            live,
            test_reference_prefix: test_reference_prefix.into(),
        }
    }

    /// 仅模拟网关
    pub fn simulated_only(prefix: impl Into<String>) -> Self {
        Self::new(Arc::new(SimulatedGateway), None, prefix)
    }

    /// 按配置构建
    ///
    /// 开启真实退款时必须提供 Stripe 密钥。
    pub fn from_config(config: &PaymentConfig) -> Result<Self, PaymentError> {
        if !config.live_capture_enabled {
            info!("Live refund capture disabled, all settlements are simulated");
            return Ok(Self::simulated_only(&config.test_reference_prefix));
        }

        let secret_key = config
            .stripe_secret_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PaymentError::NotConfigured("已开启真实退款，但未设置 stripe_secret_key".to_string())
            })?;

        let live = StripeGateway::new(&config.stripe_base_url, secret_key, config.timeout_ms)?;
        info!(base_url = %config.stripe_base_url, "Live refund capture enabled via Stripe");

        Ok(Self::new(
            Arc::new(SimulatedGateway),
            Some(Arc::new(live)),
            &config.test_reference_prefix,
        ))
    }

    /// 是否为测试支付凭证
    pub fn is_test_reference(&self, payment_intent_id: &str) -> bool {
        payment_intent_id.starts_with(&self.test_reference_prefix)
    }

    /// 选择本次结算使用的网关
    pub fn select(&self, request: &SettlementRequest) -> &Arc<dyn SettlementGateway> {
        let Some(live) = &self.live else {
            return &self.simulated;
        };

        match request.payment_intent_id.as_deref() {
            Some(pi) if !self.is_test_reference(pi) => live,
            Some(_) => &self.simulated,
            None => {
                warn!(
                    refund_id = %request.refund_id,
                    "Refund has no payment intent, falling back to simulated settlement"
                );
                &self.simulated
            }
        }
    }
}
