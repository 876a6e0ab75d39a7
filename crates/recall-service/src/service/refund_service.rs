//! 退款服务
//!
//! 退款生命周期：创建时为 pending，发放时经结算网关取得结算凭证后
//! 以 `status = pending` 为前置条件更新为 issued。重复发放不会覆盖已有凭证，
//! 而是返回 `AlreadyIssued`。

use std::sync::Arc;
use std::time::Instant;

use recall_shared::observability::metrics;
use tracing::{info, instrument, warn};

use crate::error::{RecallError, Result};
use crate::models::{MAX_REFUND_AMOUNT, NewRefund, Refund, RefundStatus};
use crate::payment::{SettlementRequest, SettlementRouter};
use crate::repository::{MarkIssuedOutcome, RefundRepository};
use crate::service::dto::IssuedRefund;

pub struct RefundService {
    refunds: RefundRepository,
    router: Arc<SettlementRouter>,
}

impl RefundService {
    pub fn new(refunds: RefundRepository, router: Arc<SettlementRouter>) -> Self {
        Self { refunds, router }
    }

    /// 创建待处理退款，返回退款 ID
    ///
    /// 只校验参数形态，不检查购买记录与客户是否存在。
    #[instrument(skip(self, refund), fields(purchase_id = %refund.purchase_id, amount = refund.amount))]
    pub async fn create_pending_refund(&self, refund: NewRefund) -> Result<String> {
        if refund.purchase_id.trim().is_empty() || refund.customer_id.trim().is_empty() {
            return Err(RecallError::Validation(
                "purchaseId 和 customerId 不能为空".to_string(),
            ));
        }
        if !(1..=MAX_REFUND_AMOUNT).contains(&refund.amount) {
            return Err(RecallError::Validation(format!(
                "amount 必须为 1 到 {} 之间的整数（分），实际为 {}",
                MAX_REFUND_AMOUNT, refund.amount
            )));
        }

        let created = self.refunds.create_pending(&refund).await?;
        metrics::record_refund_created();
        info!(refund_id = %created.id, "Pending refund created");

        Ok(created.id)
    }

    /// 发放退款
    #[instrument(skip(self))]
    pub async fn issue_refund(&self, refund_id: &str) -> Result<IssuedRefund> {
        let refund = self
            .refunds
            .get(refund_id)
            .await?
            .ok_or_else(|| RecallError::RefundNotFound(refund_id.to_string()))?;

        if let Some(settlement_ref) = refund.settlement_ref() {
            return Err(RecallError::AlreadyIssued {
                refund_id: refund.id.clone(),
                settlement_ref: settlement_ref.to_string(),
            });
        }

        let request = SettlementRequest {
            refund_id: refund.id.clone(),
            payment_intent_id: refund.payment_intent_id.clone(),
            amount: refund.amount,
        };
        let gateway = self.router.select(&request);
        let gateway_name = gateway.name();

        let started = Instant::now();
        let settlement = match gateway.refund(&request).await {
            Ok(settlement) => settlement,
            Err(e) => {
                metrics::record_refund_settlement(
                    gateway_name,
                    "failed",
                    started.elapsed().as_secs_f64(),
                );
                return Err(e.into());
            }
        };
        let elapsed = started.elapsed().as_secs_f64();

        match self
            .refunds
            .mark_issued(&refund.id, &settlement.settlement_ref)
            .await?
        {
            MarkIssuedOutcome::Issued(_) => {
                metrics::record_refund_settlement(settlement.gateway, "issued", elapsed);
                info!(
                    refund_id = %refund.id,
                    settlement_ref = %settlement.settlement_ref,
                    gateway = settlement.gateway,
                    "Refund issued"
                );
                Ok(IssuedRefund {
                    refund_id: refund.id,
                    settlement_ref: settlement.settlement_ref,
                    gateway: settlement.gateway,
                })
            }
            MarkIssuedOutcome::AlreadyIssued(current) => {
                // 并发请求先完成了状态迁移，本次结算结果不落库
                warn!(
                    refund_id = %refund.id,
                    discarded_ref = %settlement.settlement_ref,
                    "Refund was issued concurrently"
                );
                metrics::record_refund_settlement(settlement.gateway, "already_issued", elapsed);
                Err(RecallError::AlreadyIssued {
                    refund_id: current.id.clone(),
                    settlement_ref: current.settlement_ref().unwrap_or_default().to_string(),
                })
            }
            MarkIssuedOutcome::NotFound => Err(RecallError::RefundNotFound(refund.id)),
        }
    }

    /// 查询单笔退款
    #[instrument(skip(self))]
    pub async fn get_refund_status(&self, refund_id: &str) -> Result<Refund> {
        self.refunds
            .get(refund_id)
            .await?
            .ok_or_else(|| RecallError::RefundNotFound(refund_id.to_string()))
    }

    /// 按创建时间倒序列出退款
    #[instrument(skip(self))]
    pub async fn list_refunds(&self, status: Option<RefundStatus>) -> Result<Vec<Refund>> {
        Ok(self.refunds.list(status).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{MockSettlementGateway, PaymentError, Settlement, SimulatedGateway};
    use recall_shared::document::MemoryDocumentStore;

    fn new_refund(amount: i64) -> NewRefund {
        NewRefund {
            purchase_id: "purch_1".to_string(),
            payment_intent_id: Some("pi_mock_12345".to_string()),
            amount,
            customer_id: "cust_1".to_string(),
        }
    }

    fn service_with(gateway: MockSettlementGateway) -> RefundService {
        let store = Arc::new(MemoryDocumentStore::new());
        let router = SettlementRouter::new(Arc::new(gateway), None, "pi_mock");
        RefundService::new(RefundRepository::new(store), Arc::new(router))
    }

    fn succeeding_gateway(times: usize) -> MockSettlementGateway {
        let mut gateway = MockSettlementGateway::new();
        gateway.expect_name().return_const("simulated");
        gateway.expect_refund().times(times).returning(|req| {
            Ok(Settlement {
                settlement_ref: format!("sim_re_{}", req.refund_id),
                gateway: "simulated",
            })
        });
        gateway
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_amount() {
        let service = service_with(succeeding_gateway(0));
        for amount in [0, -5] {
            let result = service.create_pending_refund(new_refund(amount)).await;
            assert!(matches!(result, Err(RecallError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_create_amount_upper_bound() {
        let service = service_with(succeeding_gateway(0));

        let id = service
            .create_pending_refund(new_refund(MAX_REFUND_AMOUNT))
            .await
            .unwrap();
        assert_eq!(service.get_refund_status(&id).await.unwrap().amount, MAX_REFUND_AMOUNT);

        for amount in [MAX_REFUND_AMOUNT + 1, i64::MAX] {
            let result = service.create_pending_refund(new_refund(amount)).await;
            assert!(matches!(result, Err(RecallError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_ids() {
        let service = service_with(succeeding_gateway(0));
        let mut refund = new_refund(499);
        refund.customer_id = "  ".to_string();
        let result = service.create_pending_refund(refund).await;
        assert!(matches!(result, Err(RecallError::Validation(_))));
    }

    #[tokio::test]
    async fn test_issue_twice_calls_gateway_once() {
        let service = service_with(succeeding_gateway(1));
        let id = service.create_pending_refund(new_refund(499)).await.unwrap();

        let issued = service.issue_refund(&id).await.unwrap();
        assert_eq!(issued.settlement_ref, format!("sim_re_{id}"));

        match service.issue_refund(&id).await {
            Err(RecallError::AlreadyIssued { settlement_ref, .. }) => {
                assert_eq!(settlement_ref, issued.settlement_ref);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let refund = service.get_refund_status(&id).await.unwrap();
        assert_eq!(refund.status(), RefundStatus::Issued);
        assert_eq!(refund.amount, 499);
        assert!(refund.issued_at().is_some());
    }

    /// 记录计数器名称的本地 recorder
    #[derive(Default)]
    struct CounterNames(std::sync::Mutex<Vec<String>>);

    impl ::metrics::Recorder for CounterNames {
        fn describe_counter(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_gauge(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_histogram(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}

        fn register_counter(&self, key: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Counter {
            self.0.lock().unwrap().push(key.name().to_string());
            ::metrics::Counter::noop()
        }

        fn register_gauge(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Gauge {
            ::metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Histogram {
            ::metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_reissue_records_no_settlement() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let service = service_with(succeeding_gateway(1));
        let id = rt
            .block_on(service.create_pending_refund(new_refund(499)))
            .unwrap();

        let first = CounterNames::default();
        ::metrics::with_local_recorder(&first, || rt.block_on(service.issue_refund(&id))).unwrap();
        assert!(first.0.lock().unwrap().iter().any(|n| n == "refund_settlements_total"));

        let second = CounterNames::default();
        let result = ::metrics::with_local_recorder(&second, || rt.block_on(service.issue_refund(&id)));
        assert!(matches!(result, Err(RecallError::AlreadyIssued { .. })));
        assert!(second.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_missing_refund() {
        let service = service_with(succeeding_gateway(0));
        let result = service.issue_refund("nope").await;
        assert!(matches!(result, Err(RecallError::RefundNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_refund_pending() {
        let mut gateway = MockSettlementGateway::new();
        gateway.expect_name().return_const("stripe");
        gateway
            .expect_refund()
            .times(1)
            .returning(|_| Err(PaymentError::Timeout));
        let service = service_with(gateway);

        let id = service.create_pending_refund(new_refund(250)).await.unwrap();
        let result = service.issue_refund(&id).await;
        assert!(matches!(result, Err(RecallError::Payment(PaymentError::Timeout))));

        let refund = service.get_refund_status(&id).await.unwrap();
        assert_eq!(refund.status(), RefundStatus::Pending);
        assert!(refund.settlement_ref().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_issue_has_single_winner() {
        let store = Arc::new(MemoryDocumentStore::new());
        let router = Arc::new(SettlementRouter::new(Arc::new(SimulatedGateway), None, "pi_mock"));
        let service = Arc::new(RefundService::new(RefundRepository::new(store), router));
        let id = service.create_pending_refund(new_refund(499)).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let id = id.clone();
                tokio::spawn(async move { service.issue_refund(&id).await })
            })
            .collect();

        let mut issued = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => issued += 1,
                Err(RecallError::AlreadyIssued { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(issued, 1);
    }

    #[tokio::test]
    async fn test_list_refunds_by_status() {
        let service = service_with(succeeding_gateway(1));
        let first = service.create_pending_refund(new_refund(100)).await.unwrap();
        service.create_pending_refund(new_refund(200)).await.unwrap();
        service.issue_refund(&first).await.unwrap();

        let issued = service.list_refunds(Some(RefundStatus::Issued)).await.unwrap();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].id, first);
        assert_eq!(service.list_refunds(None).await.unwrap().len(), 2);
    }
}
