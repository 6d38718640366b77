//! Access token generation and validation
//!
//! Access tokens are self-contained HS256 JWTs: no server-side state is
//! consulted to validate one, only the shared signing secret and the clock.

use crate::config::AppConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Fixed issuer claim; tokens from any other issuer are rejected.
pub const ISSUER: &str = "chirpy";

/// Reason an access token was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token is malformed")]
    Malformed,

    #[error("token issuer is not recognized")]
    WrongIssuer,

    #[error("token subject is not a valid user id")]
    BadSubject,
}

/// Registered claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer (always [`ISSUER`])
    pub iss: String,

    /// Subject (user ID)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Not before (equal to `iat` for tokens we issue)
    pub nbf: i64,

    /// Expiration
    pub exp: i64,
}

/// Access token codec holding the symmetric signing key
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, crate::error::AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(crate::error::AppError::Config(
                "JWT secret too short (min 32 chars)".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Sign a new access token for `user_id`, valid for `ttl` from now.
    ///
    /// The caller is responsible for clamping `ttl` to policy; the codec
    /// signs whatever window it is given.
    pub fn issue(&self, user_id: &Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + ttl;

        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            TokenError::Malformed
        })
    }

    /// Verify a token and return the user id it identifies.
    ///
    /// Enforces HS256 (algorithm substitution is rejected), the fixed
    /// issuer, and the `[nbf, exp)` validity window with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token validation failed: {:?}", e);
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
                _ => TokenError::Malformed,
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::BadSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn service() -> JwtService {
        JwtService::from_config(&test_config()).unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue(&user_id, Duration::hours(1)).unwrap();

        assert_eq!(service.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue(&user_id, Duration::seconds(-10)).unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_a_bad_signature() {
        let service = service();
        let mut config = test_config();
        config.security.jwt_secret =
            secrecy::Secret::new("another_secret_key_32_characters!!!".to_string());
        let other = JwtService::from_config(&config).unwrap();

        let token = service.issue(&Uuid::new_v4(), Duration::hours(1)).unwrap();

        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_disallowed_algorithm_is_rejected() {
        let config = test_config();
        let secret = secrecy::ExposeSecret::expose_secret(&config.security.jwt_secret).clone();
        let service = service();

        // Signed with the correct secret but HS384 instead of HS256
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let config = test_config();
        let secret = secrecy::ExposeSecret::expose_secret(&config.security.jwt_secret).clone();
        let service = service();

        let now = Utc::now();
        let claims = Claims {
            iss: "not-chirpy".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::WrongIssuer));
    }

    #[test]
    fn test_not_yet_valid_token_is_rejected() {
        let config = test_config();
        let secret = secrecy::ExposeSecret::expose_secret(&config.security.jwt_secret).clone();
        let service = service();

        let future = Utc::now() + Duration::hours(1);
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: future.timestamp(),
            nbf: future.timestamp(),
            exp: (future + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let config = test_config();
        let secret = secrecy::ExposeSecret::expose_secret(&config.security.jwt_secret).clone();
        let service = service();

        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: "not-a-uuid".to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::BadSubject));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = service();
        assert_eq!(service.verify("not.a.jwt"), Err(TokenError::Malformed));
    }
}
