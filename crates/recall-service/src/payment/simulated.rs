//! 模拟结算网关
//!
//! 不发起任何外部调用，结算凭证由退款 ID 确定性派生，重复调用得到相同凭证。

use async_trait::async_trait;
use tracing::info;

use super::{PaymentError, Settlement, SettlementGateway, SettlementRequest};

/// 模拟凭证前缀
pub const SIMULATED_REF_PREFIX: &str = "sim_re_";

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway;

impl SimulatedGateway {
    pub fn settlement_ref(refund_id: &str) -> String {
        format!("{SIMULATED_REF_PREFIX}{refund_id}")
    }
}

#[async_trait]
impl SettlementGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn refund(&self, request: &SettlementRequest) -> Result<Settlement, PaymentError> {
        let settlement_ref = Self::settlement_ref(&request.refund_id);

        info!(
            refund_id = %request.refund_id,
            payment_intent_id = ?request.payment_intent_id,
            amount = request.amount,
            settlement_ref = %settlement_ref,
            "模拟退款结算"
        );

        Ok(Settlement {
            settlement_ref,
            gateway: self.name(),
        })
    }
}
