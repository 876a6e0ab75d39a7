//! 路由配置模块
//!
//! 所有业务端点挂在 `/api` 下，探针挂在根路径。

use axum::{
    Router, middleware,
    http::HeaderValue,
    routing::{MethodRouter, get, post},
};
use recall_shared::config::CorsConfig;
use recall_shared::observability::middleware as obs_middleware;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{handlers, state::AppState};

/// 为端点补上 OPTIONS 与 405 兜底
fn endpoint(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}

/// 业务 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 退款
        .route(
            "/createPendingRefund",
            endpoint(post(handlers::refund::create_pending_refund)),
        )
        .route(
            "/issueRefund",
            endpoint(post(handlers::refund::issue_refund)),
        )
        .route(
            "/checkRefundStatus",
            endpoint(
                get(handlers::refund::check_refund_status_query)
                    .post(handlers::refund::check_refund_status_body),
            ),
        )
        .route("/getRefunds", endpoint(get(handlers::refund::list_refunds)))
        .route("/getStats", endpoint(get(handlers::stats::get_stats)))
        // 召回
        .route(
            "/findAffectedCustomers",
            endpoint(
                get(handlers::customer::find_affected_customers_query)
                    .post(handlers::customer::find_affected_customers_body),
            ),
        )
        .route(
            "/logRecallEvent",
            endpoint(post(handlers::recall::log_recall_event)),
        )
        .route("/getRecalls", endpoint(get(handlers::recall::get_recalls)))
        // 通知与样例数据
        .route("/sendEmail", endpoint(post(handlers::email::send_email)))
        .route("/seedData", endpoint(post(handlers::seed::seed_data)))
}

/// 完整应用路由（含探针与可观测性中间件）
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 跨域配置："*" 放行所有来源，否则按逗号分隔的来源列表放行
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.trim() == "*" {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", config.allowed_origins);
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
