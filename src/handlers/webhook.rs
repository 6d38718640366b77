//! 账户升级 webhook 处理器（Polka billing 回调）

use crate::{
    auth::guard, error::AppError, middleware::AppState, models::auth::PolkaWebhookPayload,
    repository::UserRepository,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use uuid::Uuid;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// Polka webhook：验证预共享 API Key 后将账户升级为 Chirpy Red。
/// Key 不匹配时无论负载内容如何都返回 401，因此先验 Key 再解析负载。
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    guard::authorize_service_key(&headers, state.config.security.polka_api_key.expose_secret())?;

    let payload: PolkaWebhookPayload =
        serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid payload"))?;

    // 未知事件直接确认，避免对方重试
    if payload.event != USER_UPGRADED_EVENT {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = Uuid::parse_str(&payload.data.user_id)
        .map_err(|_| AppError::bad_request("Invalid user ID"))?;

    let repo = UserRepository::new(state.db.clone());
    if !repo.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::not_found("user"));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(StatusCode::NO_CONTENT)
}
