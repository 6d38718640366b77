//! Opaque refresh token store
//!
//! Unlike access tokens, refresh tokens carry no claims: they are
//! high-entropy random values checked against a persisted row. Validation
//! is side-effect-free (no rotation, no extension); the only state
//! transitions are revocation and implicit expiry detected at lookup.

use crate::{error::AppError, models::auth::RefreshToken};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Raw entropy per token; hex-encoded to a fixed 64-character string.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Reason a refresh token was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token has been revoked")]
    Revoked,

    #[error("refresh token has expired")]
    Expired,
}

pub struct RefreshTokenStore {
    db: PgPool,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(db: PgPool, ttl_secs: u64) -> Self {
        Self {
            db,
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue and persist a new refresh token for `user_id`.
    ///
    /// Previously issued tokens for the same user stay valid: one row per
    /// login event, so a user may hold several concurrent sessions.
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshToken, AppError> {
        let now = Utc::now();
        let record = RefreshToken {
            token: Self::generate_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .execute(&self.db)
        .await?;

        Ok(record)
    }

    /// Validate an opaque token and return its user id.
    ///
    /// Distinguishes unknown, revoked and expired tokens; does not rotate
    /// or extend the token in any way.
    pub async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let record = self
            .find(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        if record.revoked_at.is_some() {
            return Err(RefreshTokenError::Revoked.into());
        }

        if record.expires_at <= Utc::now() {
            return Err(RefreshTokenError::Expired.into());
        }

        Ok(record.user_id)
    }

    /// Revoke a token. Revoking an already-revoked token is a no-op;
    /// revoking an unknown token reports `NotFound`.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW(), updated_at = NOW()
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            // Already revoked is idempotent; unknown is an error
            if self.find(token).await?.is_none() {
                return Err(RefreshTokenError::NotFound.into());
            }
        }

        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, AppError> {
        let record =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.db)
                .await?;

        Ok(record)
    }

    fn generate_token() -> String {
        let mut buf = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut buf);
        hex::encode(buf)
    }
}
