//! 认证服务：登录、令牌刷新、令牌撤销

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::AppError,
    models::auth::{LoginRequest, LoginResponse, RefreshResponse},
    repository::UserRepository,
    services::refresh_store::RefreshTokenStore,
};
use chrono::Duration;
use std::sync::Arc;

pub struct AuthService {
    users: UserRepository,
    refresh_tokens: RefreshTokenStore,
    jwt: Arc<JwtService>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(db: sqlx::PgPool, jwt: Arc<JwtService>, config: Arc<AppConfig>) -> Self {
        let refresh_tokens =
            RefreshTokenStore::new(db.clone(), config.security.refresh_token_ttl_secs);
        Self {
            users: UserRepository::new(db),
            refresh_tokens,
            jwt,
            config,
        }
    }

    /// 用户登录
    ///
    /// 邮箱不存在和密码错误返回同一个 401，不泄露账户是否存在。
    /// 成功时签发访问令牌并持久化一个新的刷新令牌；已有的刷新令牌保持有效。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let hasher = PasswordHasher::new();
        if !hasher.verify(&req.password, &user.hashed_password)? {
            tracing::debug!(user_id = %user.id, "Password mismatch on login");
            return Err(AppError::Unauthorized);
        }

        let ttl = clamp_access_ttl(
            req.expires_in_seconds,
            self.config.security.access_token_ttl_secs,
        );
        let token = self.jwt.issue(&user.id, ttl)?;
        let refresh = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
            token,
            refresh_token: refresh.token,
        })
    }

    /// 刷新访问令牌
    ///
    /// 只验证刷新令牌并签发新的访问令牌；刷新令牌本身不轮换。
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let user_id = self.refresh_tokens.validate(refresh_token).await?;

        let ttl = Duration::seconds(self.config.security.access_token_ttl_secs as i64);
        let token = self.jwt.issue(&user_id, ttl)?;

        Ok(RefreshResponse { token })
    }

    /// 撤销刷新令牌
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke(refresh_token).await
    }
}

/// 将客户端请求的访问令牌 TTL 限制到策略上限。
/// 非正值或超过上限的请求值都回退到默认值。
fn clamp_access_ttl(requested_secs: Option<i64>, default_max_secs: u64) -> Duration {
    match requested_secs {
        Some(secs) if secs > 0 && secs <= default_max_secs as i64 => Duration::seconds(secs),
        _ => Duration::seconds(default_max_secs as i64),
    }
}
