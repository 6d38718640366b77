//! 管理端点：访问计数页面与重置

use crate::{error::AppError, middleware::AppState, repository::UserRepository};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// 访问计数页面（HTML）
pub async fn metrics_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);

    Html(format!(
        r#"
<html>
<body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {hits} times!</p>
</body>
</html>"#
    ))
}

/// 重置访问计数；仅在 dev 平台上同时清空用户表
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    if state.config.app.platform == "dev" {
        let repo = UserRepository::new(state.db.clone());
        let deleted = repo.delete_all().await?;
        tracing::info!(deleted, "Dev reset: deleted all users");
    }

    state.fileserver_hits.store(0, Ordering::Relaxed);

    Ok(format!("Hits: {}", state.fileserver_hits.load(Ordering::Relaxed)))
}
