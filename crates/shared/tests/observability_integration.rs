//! 可观测性模块集成测试

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use recall_shared::observability::metrics::{
        record_email, record_http_request, record_recall_event, record_refund_created,
        record_refund_settlement,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/getRefunds", 200, 0.05);
        record_http_request("POST", "/api/issueRefund", 409, 0.12);
        record_http_request("GET", "/api/issueRefund", 405, 0.01);
        record_http_request("POST", "/api/createPendingRefund", 500, 0.25);
    }

    #[test]
    fn test_record_refund_metrics() {
        record_refund_created();
        record_refund_settlement("simulated", "issued", 0.01);
        record_refund_settlement("stripe", "failed", 2.5);
        record_refund_settlement("simulated", "already_issued", 0.0);
    }

    #[test]
    fn test_metrics_with_edge_cases() {
        record_http_request("", "", 0, 0.0);

        let long_path = "/api/".to_string() + &"x".repeat(1000);
        record_http_request("GET", &long_path, 200, 0.01);

        record_recall_event();
        record_email("sendgrid", "masked");
    }
}

// ============================================================================
// 中间件测试
// ============================================================================

mod middleware_tests {
    use recall_shared::observability::middleware::RequestId;

    #[test]
    fn test_request_id_creation() {
        let id = RequestId("test-id-123".to_string());
        assert_eq!(id.as_str(), "test-id-123");
    }

    #[test]
    fn test_request_id_debug() {
        let id = RequestId("debug-test".to_string());
        assert!(format!("{:?}", id).contains("debug-test"));
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use recall_shared::observability::ObservabilityConfig;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "unknown-service");
        assert_eq!(config.metrics_port, 9090);
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_with_service_name() {
        let config = ObservabilityConfig::default().with_service_name("recall-service");
        assert_eq!(config.service_name, "recall-service");
    }
}

// ============================================================================
// Guard 测试
// ============================================================================

mod guard_tests {
    use recall_shared::observability::ObservabilityGuard;

    #[test]
    fn test_empty_guard() {
        let guard = ObservabilityGuard::empty();
        drop(guard);
    }
}
