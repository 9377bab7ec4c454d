use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, SigningError};

/// Claims carried by every session token. `sub` is the user's login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(login: &str, ttl: Duration) -> Result<Self, SigningError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or(SigningError::TtlOutOfRange)?;
        Ok(Self {
            sub: login.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

/// Mint an HS256 token for `login` that expires `ttl` from now.
pub fn issue_token(login: &str, secret: &str, ttl: Duration) -> Result<String, SigningError> {
    if secret.is_empty() {
        return Err(SigningError::EmptySecret);
    }

    let token = encode(
        &Header::new(Algorithm::HS256),
        &Claims::new(login, ttl)?,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Parse a token, check its signature, then its expiry.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("token rejected: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            }
        })
}
