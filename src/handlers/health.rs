//! 健康检查处理器
//! 提供 /api/healthz 和 /api/ready 端点

use crate::{db, middleware::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// 就绪探针
/// 检查数据库连接
pub async fn readiness(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    db::record_pool_metrics(&state.db);

    match db::health_check(&state.db).await {
        db::HealthStatus::Healthy => (
            StatusCode::OK,
            Json(ReadinessResponse {
                ready: true,
                message: None,
            }),
        ),
        db::HealthStatus::Unhealthy(message) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                message: Some(message),
            }),
        ),
    }
}
