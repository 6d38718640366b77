//! Chirp domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A single posted message
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create chirp request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChirpRequest {
    #[validate(length(max = 140, message = "Chirp is too long"))]
    pub body: String,
}
