//! 用户相关的 HTTP 处理器

use crate::{
    auth::{guard, PasswordHasher},
    error::AppError,
    middleware::AppState,
    models::user::{CreateUserRequest, UpdateUserRequest, UserResponse},
    repository::UserRepository,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 注册用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let hasher = PasswordHasher::new();
    let hashed_password = hasher.hash(&req.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.create(&req.email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 修改当前用户的邮箱和密码（需要认证）
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = guard::authenticate(&headers, &state.jwt_service)?;

    req.validate()?;

    let hasher = PasswordHasher::new();
    let hashed_password = hasher.hash(&req.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update_credentials(user_id, &req.email, &hashed_password)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(user)))
}
