//! Request-level authorization checks
//!
//! Composes the header parser with the token codec to turn raw request
//! headers into an authenticated user id, plus the ownership and
//! pre-shared-key decisions gating mutations and webhooks.

use crate::{
    auth::{header, jwt::JwtService},
    error::AppError,
};
use axum::http::HeaderMap;
use uuid::Uuid;

/// Authenticate a request from its `Authorization: Bearer` header.
/// Surfaces the first failure: a malformed header or an invalid token.
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<Uuid, AppError> {
    let token = header::bearer_token(headers)?;
    Ok(jwt.verify(token)?)
}

/// A user may only mutate a resource they own. Strict equality, no roles,
/// no admin override.
pub fn authorize_ownership(user_id: Uuid, resource_owner_id: Uuid) -> bool {
    user_id == resource_owner_id
}

/// Authenticate a trusted-service request carrying `Authorization: ApiKey`.
/// Binary trust decision against the pre-shared key; no per-caller identity.
pub fn authorize_service_key(headers: &HeaderMap, expected_key: &str) -> Result<(), AppError> {
    let key = header::api_key(headers)?;
    if key != expected_key {
        tracing::warn!("Service API key mismatch");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
