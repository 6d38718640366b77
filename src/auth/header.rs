//! Credential header parsing
//!
//! The `Authorization` header must be exactly `<scheme> <value>`: two
//! space-separated tokens, nothing more. These are pure parsing functions;
//! they do not authenticate anything.

use axum::http::{header, HeaderMap};
use thiserror::Error;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Malformed or missing credential header
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid authorization header")]
pub struct HeaderError;

/// Extract the token from a `Bearer <token>` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, HeaderError> {
    scheme_value(headers, BEARER_SCHEME)
}

/// Extract the key from an `ApiKey <key>` authorization header.
pub fn api_key(headers: &HeaderMap) -> Result<&str, HeaderError> {
    scheme_value(headers, API_KEY_SCHEME)
}

fn scheme_value<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, HeaderError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(HeaderError)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(s), Some(token), None) if s == scheme && !token.is_empty() => Ok(token),
        _ => Err(HeaderError),
    }
}
