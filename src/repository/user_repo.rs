//! User repository (用户数据访问)

use crate::{error::AppError, models::user::User};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建用户
    pub async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据邮箱查找用户
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 更新邮箱与密码哈希
    pub async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 升级为 Chirpy Red（billing webhook）
    pub async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 删除所有用户（仅 dev 平台的 /admin/reset 使用；级联删除 chirps 和
    /// refresh tokens）
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.db).await?;

        Ok(result.rows_affected())
    }
}
