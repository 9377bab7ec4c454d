use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use quill_auth::verify_token;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, resolved from a verified bearer token.
/// Handlers take this as `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
}

impl Identity {
    /// Ownership check for post mutation.
    pub fn owns(&self, created_by: &str) -> bool {
        self.login == created_by
    }
}

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;

    let claims = verify_token(token, &state.token_secret)?;
    debug!("authenticated request from {}", claims.sub);

    req.extensions_mut().insert(Identity { login: claims.sub });
    Ok(next.run(req).await)
}

/// Stamp the request with its deadline before anything else runs, so the
/// whole request shares one `request_timeout` budget.
pub async fn start_deadline(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(state.deadline());
    next.run(req).await
}
