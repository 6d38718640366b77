//! Authentication-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login request. `expires_in_seconds` is an optional client hint for the
/// access-token TTL; the service clamps it to the policy maximum.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub expires_in_seconds: Option<i64>,
}

/// Login response: the redacted user plus both tokens
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response: a fresh access token only, the refresh token is not
/// rotated
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Persisted refresh token row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Polka billing webhook payload. The user id stays a string here so a bad
/// id maps to a 400 instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct PolkaWebhookPayload {
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: String,
}
