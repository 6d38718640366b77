//! 消息相关的 HTTP 处理器

use crate::{
    auth::guard,
    error::AppError,
    middleware::AppState,
    models::chirp::CreateChirpRequest,
    repository::ChirpRepository,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 发布消息（需要认证）
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = guard::authenticate(&headers, &state.jwt_service)?;

    req.validate()?;

    let repo = ChirpRepository::new(state.db.clone());
    let chirp = repo.create(&req.body, user_id).await?;

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// 列出全部消息
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let repo = ChirpRepository::new(state.db.clone());
    let chirps = repo.list_all().await?;

    Ok(Json(chirps))
}

/// 获取单条消息
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let repo = ChirpRepository::new(state.db.clone());
    let chirp = repo
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    Ok(Json(chirp))
}

/// 删除消息（需要认证，且只能删除自己的消息）
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(chirp_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = guard::authenticate(&headers, &state.jwt_service)?;

    let repo = ChirpRepository::new(state.db.clone());
    let chirp = repo
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    if !guard::authorize_ownership(user_id, chirp.user_id) {
        tracing::warn!(
            user_id = %user_id,
            owner_id = %chirp.user_id,
            chirp_id = %chirp_id,
            "Ownership check failed on chirp delete"
        );
        return Err(AppError::Forbidden);
    }

    if !repo.delete(chirp_id, user_id).await? {
        return Err(AppError::not_found("chirp"));
    }

    Ok(StatusCode::NO_CONTENT)
}
