//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册业务指标描述（出现在 /metrics 的 HELP 注释中）
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("refunds_created_total", "Total number of pending refunds created");
    metrics::describe_counter!("refund_settlements_total", "Total number of refund settlement attempts");
    metrics::describe_histogram!(
        "refund_settlement_duration_seconds",
        "Refund settlement duration in seconds"
    );

    metrics::describe_counter!("recall_events_total", "Total number of recall events logged");
    metrics::describe_counter!("emails_total", "Total number of customer email attempts");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录待处理退款创建
#[inline]
pub fn record_refund_created() {
    metrics::counter!("refunds_created_total").increment(1);
}

/// 记录退款结算
///
/// `gateway` 为实际使用的网关（simulated / stripe），`status` 为 issued / already_issued / failed。
#[inline]
pub fn record_refund_settlement(gateway: &str, status: &str, duration_secs: f64) {
    metrics::counter!(
        "refund_settlements_total",
        "gateway" => gateway.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "refund_settlement_duration_seconds",
        "gateway" => gateway.to_string()
    )
    .record(duration_secs);
}

/// 记录召回事件
#[inline]
pub fn record_recall_event() {
    metrics::counter!("recall_events_total").increment(1);
}

/// 记录邮件发送结果
#[inline]
pub fn record_email(mode: &str, outcome: &str) {
    metrics::counter!(
        "emails_total",
        "mode" => mode.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
