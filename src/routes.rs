//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::{handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/api/healthz", get(handlers::health::healthz))
        .route("/api/ready", get(handlers::health::readiness));

    // 认证与账户
    let auth_routes = Router::new()
        .route(
            "/api/users",
            post(handlers::user::create_user).put(handlers::user::update_user),
        )
        .route("/api/login", post(handlers::auth::login))
        .route("/api/refresh", post(handlers::auth::refresh))
        .route("/api/revoke", post(handlers::auth::revoke));

    // 消息
    let chirp_routes = Router::new()
        .route(
            "/api/chirps",
            post(handlers::chirp::create_chirp).get(handlers::chirp::list_chirps),
        )
        .route(
            "/api/chirps/{chirp_id}",
            get(handlers::chirp::get_chirp).delete(handlers::chirp::delete_chirp),
        );

    // 可信服务 webhook
    let webhook_routes =
        Router::new().route("/api/polka/webhooks", post(handlers::webhook::polka_webhook));

    // 管理端点
    let admin_routes = Router::new()
        .route("/admin/metrics", get(handlers::admin::metrics_page))
        .route("/admin/reset", post(handlers::admin::reset));

    // 静态文件服务（带访问计数）
    let fileserver = Router::new()
        .fallback_service(ServeDir::new(&state.config.app.assets_dir))
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::hit_count_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(chirp_routes)
        .merge(webhook_routes)
        .merge(admin_routes)
        .nest_service("/app", fileserver)
        .layer(from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
