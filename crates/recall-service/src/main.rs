//! 召回管理服务入口
//!
//! 提供退款、召回、统计与邮件通知的 REST API。

use std::sync::Arc;

use anyhow::Context;
use recall_service::{AppState, build_router, cors_layer};
use recall_shared::{
    config::{AppConfig, StoreBackend},
    document::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    observability,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "recall-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：default.toml -> {env}.toml -> recall-service.toml -> 环境变量
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        backend = ?config.store.backend,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            if config.is_production() {
                warn!("In-memory document store in production, data is lost on restart");
            }
            Arc::new(MemoryDocumentStore::new())
        }
        StoreBackend::Postgres => Arc::new(PgDocumentStore::connect(&config.database).await?),
    };
    info!(backend = store.backend(), "Document store ready");

    let state = AppState::build(store, &config)?;
    if config.payment.live_capture_enabled {
        warn!("Live refund capture is enabled, non-test payment intents will be refunded for real");
    }
    info!(email_mode = state.email_service.mode(), "Services initialized");

    let app = build_router(state).layer(cors_layer(&config.cors));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 监听关闭信号
///
/// SIGTERM 或 Ctrl+C 任一到达即返回，触发 axum 的优雅关闭。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
