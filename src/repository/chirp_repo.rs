//! Chirp repository (消息数据访问)

use crate::{error::AppError, models::chirp::Chirp};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ChirpRepository {
    db: PgPool,
}

impl ChirpRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建消息
    pub async fn create(&self, body: &str, user_id: Uuid) -> Result<Chirp, AppError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (body, user_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(chirp)
    }

    /// 列出全部消息（按创建时间升序）
    pub async fn list_all(&self) -> Result<Vec<Chirp>, AppError> {
        let chirps =
            sqlx::query_as::<_, Chirp>("SELECT * FROM chirps ORDER BY created_at ASC")
                .fetch_all(&self.db)
                .await?;

        Ok(chirps)
    }

    /// 根据 ID 查找消息
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        let chirp = sqlx::query_as::<_, Chirp>("SELECT * FROM chirps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(chirp)
    }

    /// 删除消息（按 ID 和所有者双重约束）
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
