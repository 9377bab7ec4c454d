use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json`, but a body that fails to parse comes back as a 400 in the
/// usual error envelope instead of axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
