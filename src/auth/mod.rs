//! Bearer-token auth gate.
//!
//! Tokens are HS256 JWTs signed with the `JWT_KEY` secret, issued at
//! registration and login with the user id as subject and a fixed 1-day
//! validity window. Protected handlers call [`authenticate`] to resolve
//! the `Authorization: Bearer <token>` header to a caller identity.

pub mod password;

use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// Token validity window
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Caller identity resolved from a verified token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Issue a signed token carrying the user id as subject
pub fn issue_token(user_id: &str, jwt_key: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_key.as_bytes()),
    )
    .map_err(|e| {
        log::error!("Failed to sign token: {}", e);
        ApiError::Server
    })
}

/// Verify a token's signature and expiry, yielding its claims
pub fn verify_token(token: &str, jwt_key: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_key.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidToken)
}

/// Resolve the caller identity from a request's Authorization header.
///
/// Missing or malformed header -> 401. Present but invalid or expired
/// token -> 403. No side effects.
pub fn authenticate(req: &HttpRequest, jwt_key: &str) -> Result<AuthUser, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    let claims = verify_token(token, jwt_key)?;

    Ok(AuthUser { id: claims.sub })
}
