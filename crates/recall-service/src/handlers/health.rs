//! 健康检查

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// 存活探针
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.service_name,
    }))
}

/// 就绪探针：检查文档存储是否可用
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let store_ok = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store.backend(), "Store health check failed");
            false
        }
    };

    Json(json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "service": state.service_name,
        "checks": {
            "store": if store_ok { "ok" } else { "fail" },
            "backend": state.store.backend(),
        }
    }))
}
