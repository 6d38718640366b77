//! 认证相关的 HTTP 处理器

use crate::{auth::header, error::AppError, middleware::AppState, models::auth::LoginRequest};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}

/// 刷新访问令牌（刷新令牌通过 Bearer 头传递）
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = header::bearer_token(&headers)?;

    let response = state.auth_service.refresh(refresh_token).await?;

    Ok(Json(response))
}

/// 撤销刷新令牌
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = header::bearer_token(&headers)?;

    state.auth_service.revoke(refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
