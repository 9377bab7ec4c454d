use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use quill_auth::{AuthError, ValidationError};
use quill_db::DbError;
use quill_types::api::Envelope;

/// Every way a request can fail. The Display text is what goes into the
/// `error` field of the response envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to decode request")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("missing or malformed authorization header")]
    MissingToken,

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("invalid user")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Not-found and not-owner stay on 400 to keep the API's existing contract.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_)
            | Self::Validation(_)
            | Self::Forbidden
            | Self::NotFound(_)
            | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a storage error, using `context` as the client-facing message for
    /// anything that isn't one of the expected rejections.
    pub fn from_db(err: DbError, context: &str) -> Self {
        match err {
            DbError::UserExists(_) => Self::Conflict("user already exists".into()),
            DbError::PostNotFound(_) => Self::NotFound("post doesn't exist".into()),
            DbError::AlreadyLiked(id) => Self::Conflict(format!("you have already liked post {}", id)),
            DbError::NotLiked(id) => Self::Conflict(format!("you haven't liked post {}", id)),
            other => {
                error!("{}: {}", context, other);
                Self::Internal(context.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Decode(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Decode(detail) => warn!("failed to decode request body: {}", detail),
            Self::Internal(msg) => error!("request failed: {}", msg),
            Self::Timeout => warn!("request timed out"),
            other => warn!("invalid request: {}", other),
        }

        (status, Json(Envelope::error(self.to_string()))).into_response()
    }
}
