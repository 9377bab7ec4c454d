use axum::{Json, extract::State};
use tracing::info;

use quill_auth::{hash_password, issue_token, validate_login, validate_password, verify_password};
use quill_types::api::{Envelope, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::{AppState, Deadline};

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    deadline: Deadline,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<Envelope<RegisterResponse>>, ApiError> {
    let login = req.login.trim().to_string();
    let password = req.password.trim().to_string();

    validate_login(&login)?;

    // Fast path for a friendly error; the UNIQUE constraint decides.
    let lookup = login.clone();
    if state
        .db_call(deadline, "failed to check if user exists", move |db| db.user_exists(&lookup))
        .await?
    {
        return Err(ApiError::Conflict("user already exists".into()));
    }

    validate_password(&password)?;

    let password_hash = deadline
        .run_blocking("failed to encrypt password", move || hash_password(&password))
        .await?
        .map_err(|e| {
            tracing::error!("{}", e);
            ApiError::Internal("failed to encrypt password".into())
        })?;

    let new_login = login.clone();
    let id = state
        .db_call(deadline, "failed to save user", move |db| db.create_user(&new_login, &password_hash))
        .await?;

    info!("user {} registered with id {}", login, id);
    Ok(Json(Envelope::ok(RegisterResponse { id })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    deadline: Deadline,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let login = req.login.trim().to_string();
    let password = req.password.trim().to_string();

    validate_login(&login)?;

    let lookup = login.clone();
    let user = state
        .db_call(deadline, "failed to get user's password", move |db| db.get_user_by_login(&lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound("user does not exist".into()))?;

    validate_password(&password)?;

    let stored = user.password_hash.clone();
    let matches = deadline
        .run_blocking("failed to check password", move || verify_password(&password, &stored))
        .await?;

    if !matches {
        return Err(ApiError::Validation("invalid password".into()));
    }

    let token = issue_token(&user.login, &state.token_secret, state.token_ttl).map_err(|e| {
        tracing::error!("{}", e);
        ApiError::Internal("failed to generate token".into())
    })?;

    info!("user {} logged in", user.login);
    Ok(Json(Envelope::ok(LoginResponse { token })))
}
