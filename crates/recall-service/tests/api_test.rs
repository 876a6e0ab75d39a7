//! HTTP API 集成测试
//!
//! 基于内存文档存储构建完整路由，用 oneshot 逐个请求验证端点行为。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use recall_service::{
    AppState, build_router, cors_layer,
    models::MAX_REFUND_AMOUNT,
    notification::{
        EmailMessage, EmailReceipt, EmailSender, EmailService, LoggingEmailSender,
        NotificationError,
    },
    payment::{
        PaymentError, Settlement, SettlementGateway, SettlementRequest, SettlementRouter,
        SimulatedGateway,
    },
};
use recall_shared::config::{CorsConfig, EmailFailurePolicy};
use recall_shared::document::MemoryDocumentStore;
use serde_json::{Value, json};
use tower::ServiceExt;

/// 记录调用次数的模拟网关
#[derive(Default)]
struct CountingGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl SettlementGateway for CountingGateway {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn refund(&self, request: &SettlementRequest) -> Result<Settlement, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        SimulatedGateway.refund(request).await
    }
}

/// 始终失败的邮件渠道
struct RejectingSender;

#[async_trait]
impl EmailSender for RejectingSender {
    fn mode(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, _message: &EmailMessage) -> Result<EmailReceipt, NotificationError> {
        Err(NotificationError::Rejected {
            status: 401,
            message: "The provided authorization grant is invalid".to_string(),
        })
    }
}

struct TestApp {
    router: Router,
    gateway: Arc<CountingGateway>,
}

fn app_with_email(email: EmailService) -> TestApp {
    let gateway = Arc::new(CountingGateway::default());
    let state = AppState::with_components(
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(SettlementRouter::new(gateway.clone(), None, "pi_mock")),
        Arc::new(email),
        7,
        "recall-service",
    );
    TestApp {
        router: build_router(state),
        gateway,
    }
}

fn app() -> TestApp {
    app_with_email(EmailService::new(
        Arc::new(LoggingEmailSender),
        EmailFailurePolicy::Report,
    ))
}

impl TestApp {
    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    async fn seed(&self) {
        let (status, body) = self.request("POST", "/api/seedData", None).await;
        assert_eq!(status, StatusCode::OK, "seed failed: {body}");
    }

    async fn create_refund(&self, amount: i64) -> String {
        let (status, body) = self
            .post(
                "/api/createPendingRefund",
                json!({
                    "purchaseId": "purch_1",
                    "paymentIntentId": "pi_mock_12345",
                    "amount": amount,
                    "customerId": "cust_1"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body["refundId"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_refund_round_trip() {
    let app = app();
    let refund_id = app.create_refund(499).await;

    let (status, body) = app
        .get(&format!("/api/checkRefundStatus?refundId={refund_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["amount"], 499);
    assert!(body["createdAt"].is_string());
    assert!(body.get("issuedAt").is_none());
    assert!(body.get("settlementRef").is_none());

    let (status, body) = app
        .post("/api/issueRefund", json!({ "refundId": refund_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "issued");
    assert_eq!(body["settlementRef"], format!("sim_re_{refund_id}"));

    let (status, body) = app
        .post("/api/checkRefundStatus", json!({ "refundId": refund_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "issued");
    assert!(body["issuedAt"].is_string());
    assert_eq!(body["settlementRef"], format!("sim_re_{refund_id}"));
}

#[tokio::test]
async fn test_issue_twice_conflicts_and_settles_once() {
    let app = app();
    let refund_id = app.create_refund(499).await;

    let (status, first) = app
        .post("/api/issueRefund", json!({ "refundId": refund_id }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = app
        .post("/api/issueRefund", json!({ "refundId": refund_id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(second["code"], "ALREADY_ISSUED");
    assert_eq!(second["settlementRef"], first["settlementRef"]);

    assert_eq!(app.gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_issue_refund_errors() {
    let app = app();

    let (status, body) = app
        .post("/api/issueRefund", json!({ "refundId": "missing" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REFUND_NOT_FOUND");

    let (status, body) = app.post("/api/issueRefund", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app.get("/api/issueRefund").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(app.gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_create_refund_validation() {
    let app = app();
    let cases = [
        json!({"purchaseId": "purch_1", "amount": 0, "customerId": "cust_1"}),
        json!({"purchaseId": "purch_1", "amount": 12.5, "customerId": "cust_1"}),
        json!({"amount": 499, "customerId": "cust_1"}),
        json!({"purchaseId": "purch_1", "amount": 499, "customerId": "cust_1", "status": "issued"}),
    ];
    for case in cases {
        let (status, body) = app.post("/api/createPendingRefund", case.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}: {body}");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/createPendingRefund")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/createPendingRefund",
            json!({"purchaseId": "purch_1", "amount": MAX_REFUND_AMOUNT, "customerId": "cust_1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["refundId"].is_string());

    for amount in [MAX_REFUND_AMOUNT + 1, i64::MAX] {
        let (status, body) = app
            .post(
                "/api/createPendingRefund",
                json!({"purchaseId": "purch_1", "amount": amount, "customerId": "cust_1"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {amount}: {body}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    let (status, body) = app.get("/api/getStats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pendingCount"], 1);
}

#[tokio::test]
async fn test_options_and_method_not_allowed() {
    let app = app();

    let (status, body) = app.request("OPTIONS", "/api/getStats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = app.request("DELETE", "/api/getRefunds", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");

    let (status, _) = app.get("/api/seedData").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_seeded_affected_customers() {
    let app = app();
    app.seed().await;

    let (status, body) = app
        .get("/api/findAffectedCustomers?sku=LET-123&batch=BATCH-441")
        .await;
    assert_eq!(status, StatusCode::OK);

    let customers = body["customers"].as_array().unwrap();
    let mut purchase_ids: Vec<_> = customers
        .iter()
        .map(|c| c["purchaseId"].as_str().unwrap())
        .collect();
    purchase_ids.sort();
    assert_eq!(purchase_ids, vec!["purch_1", "purch_2"]);

    let alice = customers.iter().find(|c| c["purchaseId"] == "purch_1").unwrap();
    assert_eq!(alice["customerName"], "Alice Johnson");
    assert_eq!(alice["customerEmail"], "alice@example.com");
    assert_eq!(alice["date"], "2023-10-01");
    assert_eq!(body["unresolvedPurchaseIds"], json!([]));

    let (status, body) = app
        .post(
            "/api/findAffectedCustomers",
            json!({"sku": "LET-123", "batch": "BATCH-999"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let customers = body["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["purchaseId"], "purch_3");
    assert_eq!(customers[0]["customerName"], "Charlie Brown");

    let (status, _) = app.get("/api/findAffectedCustomers?sku=LET-123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_reconcile_with_refunds() {
    let app = app();
    app.seed().await;
    let refund_id = app.create_refund(1000).await;
    app.post("/api/issueRefund", json!({ "refundId": refund_id }))
        .await;

    let (status, stats) = app.get("/api/getStats").await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = app.get("/api/getRefunds").await;
    let refunds = list["refunds"].as_array().unwrap();
    assert_eq!(refunds.len(), 5);

    let issued_total: i64 = refunds
        .iter()
        .filter(|r| r["status"] == "issued")
        .map(|r| r["amount"].as_i64().unwrap())
        .sum();
    assert_eq!(stats["totalRefunded"], issued_total);
    assert_eq!(stats["totalRefunded"], 499 + 499 + 1000);
    assert_eq!(
        stats["pendingCount"].as_u64().unwrap() + stats["issuedCount"].as_u64().unwrap(),
        refunds.len() as u64
    );
    assert_eq!(stats["chartData"].as_array().unwrap().len(), 7);
    assert_eq!(stats["chartData"][0]["name"], "Mon");
    assert_eq!(stats["dailyData"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_list_refunds_filter_and_order() {
    let app = app();
    app.seed().await;

    let (status, body) = app.get("/api/getRefunds?status=pending").await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["refunds"].as_array().unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|r| r["status"] == "pending"));

    let (_, body) = app.get("/api/getRefunds").await;
    let created: Vec<_> = body["refunds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["createdAt"].as_str().unwrap().to_string())
        .collect();
    assert!(created.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(created.last().unwrap(), "2023-10-01T10:00:00.000000Z");

    let (status, body) = app.get("/api/getRefunds?status=cancelled").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recall_feed() {
    let app = app();

    for i in 0..12 {
        let (status, body) = app
            .post(
                "/api/logRecallEvent",
                json!({
                    "sku": "LET-123",
                    "batch": format!("BATCH-{i}"),
                    "reason": "Listeria",
                    "severity": "High"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].is_string());
    }

    let (status, body) = app.get("/api/getRecalls").await;
    assert_eq!(status, StatusCode::OK);
    let recalls = body["recalls"].as_array().unwrap();
    assert_eq!(recalls.len(), 10);

    let timestamps: Vec<_> = recalls
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(recalls[0]["severity"], "High");

    let (status, _) = app
        .post(
            "/api/logRecallEvent",
            json!({"sku": "LET-123", "batch": "BATCH-441"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_mock_mode() {
    let app = app();
    let (status, body) = app
        .post(
            "/api/sendEmail",
            json!({"to": "bob@example.com", "subject": "Recall notice", "html": "<p>hi</p>"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["note"], "Mock email sent (no real email dispatched)");

    let (status, _) = app.post("/api/sendEmail", json!({"subject": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_failure_policies() {
    let email = json!({"to": "bob@example.com", "subject": "Recall notice", "html": "<p>hi</p>"});

    let report = app_with_email(EmailService::new(
        Arc::new(RejectingSender),
        EmailFailurePolicy::Report,
    ));
    let (status, body) = report.post("/api/sendEmail", email.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("401"));

    let mask = app_with_email(EmailService::new(
        Arc::new(RejectingSender),
        EmailFailurePolicy::Mask,
    ));
    let (status, body) = mask.post("/api/sendEmail", email).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["realError"].as_str().unwrap().contains("authorization"));
}

#[tokio::test]
async fn test_probes_and_request_id() {
    let app = app();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "recall-service");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["store"], "ok");
    assert_eq!(body["checks"]["backend"], "memory");

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_headers() {
    let app = app()
        .router
        .layer(cors_layer(&CorsConfig::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/getRecalls")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
