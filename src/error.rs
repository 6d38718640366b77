//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use crate::{
    auth::{header::HeaderError, jwt::TokenError, password::PasswordError},
    services::refresh_store::RefreshTokenError,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Invalid access token: {0}")]
    Token(#[from] TokenError),

    #[error("Invalid refresh token: {0}")]
    Refresh(#[from] RefreshTokenError),

    #[error("Invalid credential header: {0}")]
    Header(#[from] HeaderError),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 凭证失败统一返回 401，具体原因只进日志
            AppError::Token(_)
            | AppError::Refresh(_)
            | AppError::Header(_)
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Hashing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Token(_)
            | AppError::Refresh(_)
            | AppError::Header(_)
            | AppError::Unauthorized => "Authentication failed".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound(msg) => format!("Resource not found: {}", msg),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Hashing(_) | AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn bad_request(msg: &str) -> Self {
        AppError::BadRequest(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 记录错误日志：客户端错误记录精确原因，服务端错误记录细节
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从请求 DTO 验证错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let message = e
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| errors.iter())
            .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        AppError::Validation(message)
    }
}
