//! Stripe 退款网关
//!
//! 调用 `POST /v1/refunds`（表单编码），以退款 ID 作为 `Idempotency-Key`，
//! 同一退款重复提交时 Stripe 返回同一笔退款。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{PaymentError, Settlement, SettlementGateway, SettlementRequest};

pub struct StripeGateway {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

impl StripeGateway {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| PaymentError::NotConfigured(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client,
        })
    }
}

#[async_trait]
impl SettlementGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn refund(&self, request: &SettlementRequest) -> Result<Settlement, PaymentError> {
        let payment_intent = request.payment_intent_id.as_deref().ok_or_else(|| {
            PaymentError::NotConfigured(format!("退款 {} 缺少 paymentIntentId", request.refund_id))
        })?;

        let amount = request.amount.to_string();
        let form = [("payment_intent", payment_intent), ("amount", amount.as_str())];

        let resp = self
            .client
            .post(format!("{}/v1/refunds", self.base_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", &request.refund_id)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PaymentError::Timeout
                } else {
                    PaymentError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                refund_id = %request.refund_id,
                status = status.as_u16(),
                "Stripe rejected refund"
            );
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let refund: StripeRefund = resp
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        info!(
            refund_id = %request.refund_id,
            stripe_refund_id = %refund.id,
            stripe_status = ?refund.status,
            "Stripe refund created"
        );

        Ok(Settlement {
            settlement_ref: refund.id,
            gateway: self.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Form, Json, Router,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    /// 启动本地 Stripe 桩服务，返回 base_url
    async fn spawn_stub(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> SettlementRequest {
        SettlementRequest {
            refund_id: "ref_42".to_string(),
            payment_intent_id: Some("pi_3Nlive".to_string()),
            amount: 1299,
        }
    }

    #[tokio::test]
    async fn test_refund_success_sends_idempotency_key() {
        let app = Router::new().route(
            "/v1/refunds",
            post(|headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                assert_eq!(headers["idempotency-key"], "ref_42");
                assert_eq!(headers["authorization"], "Bearer sk_test_123");
                assert_eq!(form["payment_intent"], "pi_3Nlive");
                assert_eq!(form["amount"], "1299");
                Json(serde_json::json!({"id": "re_1ABC", "status": "succeeded"}))
            }),
        );
        let base_url = spawn_stub(app).await;

        let gateway = StripeGateway::new(base_url, "sk_test_123", 2000).unwrap();
        let settlement = gateway.refund(&request()).await.unwrap();
        assert_eq!(settlement.settlement_ref, "re_1ABC");
        assert_eq!(settlement.gateway, "stripe");
    }

    #[tokio::test]
    async fn test_refund_rejected_maps_status() {
        let app = Router::new().route(
            "/v1/refunds",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": {"message": "No such payment_intent"}})),
                )
            }),
        );
        let base_url = spawn_stub(app).await;

        let gateway = StripeGateway::new(base_url, "sk_test_123", 2000).unwrap();
        let err = gateway.refund(&request()).await.unwrap_err();
        match err {
            PaymentError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("No such payment_intent"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refund_without_payment_intent() {
        let gateway = StripeGateway::new("http://127.0.0.1:9", "sk_test_123", 200).unwrap();
        let mut req = request();
        req.payment_intent_id = None;
        assert!(matches!(
            gateway.refund(&req).await,
            Err(PaymentError::NotConfigured(_))
        ));
    }
}
