use axum::{Extension, Json, extract::State};
use tracing::info;

use quill_db::DbError;
use quill_types::api::{Empty, Envelope, PostIdRequest};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::Identity;
use crate::state::{AppState, Deadline};

/// PUT /post/like
pub async fn like(
    State(state): State<AppState>,
    deadline: Deadline,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<PostIdRequest>,
) -> Result<Json<Envelope<Empty>>, ApiError> {
    let id = req.id;
    let login = identity.login.clone();

    state
        .db_call(deadline, "failed to like post", move |db| {
            // Pre-checks only shape the error; like_post enforces both rules itself.
            if !db.post_exists(id)? {
                return Err(DbError::PostNotFound(id));
            }
            if db.has_reacted(id, &login)? {
                return Err(DbError::AlreadyLiked(id));
            }
            db.like_post(id, &login)
        })
        .await?;

    info!("post {} liked by {}", id, identity.login);
    Ok(Json(Envelope::done()))
}

/// PUT /post/unlike
pub async fn unlike(
    State(state): State<AppState>,
    deadline: Deadline,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<PostIdRequest>,
) -> Result<Json<Envelope<Empty>>, ApiError> {
    let id = req.id;
    let login = identity.login.clone();

    state
        .db_call(deadline, "failed to unlike post", move |db| {
            if !db.post_exists(id)? {
                return Err(DbError::PostNotFound(id));
            }
            db.unlike_post(id, &login)
        })
        .await?;

    info!("post {} unliked by {}", id, identity.login);
    Ok(Json(Envelope::done()))
}
