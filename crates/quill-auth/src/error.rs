use thiserror::Error;

/// Password hashing failed. Only happens on entropy or allocation trouble.
#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct HashingError(pub String);

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("token secret is empty")]
    EmptySecret,
    #[error("token lifetime overflows the calendar")]
    TtlOutOfRange,
    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Login or password does not satisfy the account rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);
