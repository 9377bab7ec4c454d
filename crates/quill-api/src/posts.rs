use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use quill_db::models::{PostRow, UserPosts};
use quill_types::api::{
    CreatePostRequest, CreatePostResponse, Empty, Envelope, PostIdRequest, UpdatePostRequest,
    UserPostsResponse,
};
use quill_types::models::{Post, timestamp};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::Identity;
use crate::state::{AppState, Deadline};

/// POST /post/create
pub async fn create_post(
    State(state): State<AppState>,
    deadline: Deadline,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> Result<Json<Envelope<CreatePostResponse>>, ApiError> {
    let title = req.title.trim().to_string();
    let text = req.text.trim().to_string();

    if title.is_empty() || text.is_empty() {
        return Err(ApiError::Validation("post's title and text can't be empty".into()));
    }

    let author = identity.login.clone();
    let id = state
        .db_call(deadline, "failed to save post", move |db| db.create_post(&author, &title, &text))
        .await?;

    info!("post {} created by {}", id, identity.login);
    Ok(Json(Envelope::ok(CreatePostResponse { id })))
}

/// PATCH /post/update: replace the title and/or the text.
pub async fn update_post(
    State(state): State<AppState>,
    deadline: Deadline,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<UpdatePostRequest>,
) -> Result<Json<Envelope<Empty>>, ApiError> {
    let title = non_empty(req.title);
    let text = non_empty(req.text);

    if title.is_none() && text.is_none() {
        return Err(ApiError::Validation("title or text must be filled in".into()));
    }

    ensure_owner(&state, deadline, req.id, &identity).await?;

    let id = req.id;
    state
        .db_call(deadline, "failed to update post", move |db| {
            db.update_post(id, title.as_deref(), text.as_deref())
        })
        .await?;

    info!("post {} updated by {}", id, identity.login);
    Ok(Json(Envelope::done()))
}

/// DELETE /post/delete
pub async fn remove_post(
    State(state): State<AppState>,
    deadline: Deadline,
    Extension(identity): Extension<Identity>,
    JsonBody(req): JsonBody<PostIdRequest>,
) -> Result<Json<Envelope<Empty>>, ApiError> {
    ensure_owner(&state, deadline, req.id, &identity).await?;

    let id = req.id;
    state
        .db_call(deadline, "failed to remove post", move |db| db.remove_post(id))
        .await?;

    info!("post {} removed by {}", id, identity.login);
    Ok(Json(Envelope::done()))
}

/// GET /user/{login}: a user's posts, newest first, with their likes.
pub async fn user_posts(
    State(state): State<AppState>,
    deadline: Deadline,
    Path(login): Path<String>,
) -> Result<Json<Envelope<UserPostsResponse>>, ApiError> {
    let lookup = login.trim().to_string();
    let listing = state
        .db_call(deadline, "failed to get user's posts", move |db| db.get_user_posts(&lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound("user doesn't exist".into()))?;

    let UserPosts { posts: rows, reactions } = listing;

    if rows.is_empty() {
        return Ok(Json(Envelope::ok(UserPostsResponse {
            posts: vec![],
            message: Some("user hasn't posted something yet".into()),
        })));
    }

    let mut liked_by: HashMap<i64, Vec<String>> = HashMap::new();
    for r in reactions {
        liked_by.entry(r.post_id).or_default().push(r.liked_by);
    }

    let posts = rows
        .into_iter()
        .map(|row| {
            let likers = liked_by.remove(&row.id).unwrap_or_default();
            to_post(row, likers)
        })
        .collect();

    Ok(Json(Envelope::ok(UserPostsResponse {
        posts,
        message: None,
    })))
}

/// The post must exist and belong to the caller. A missing post and a
/// foreign post are reported differently.
async fn ensure_owner(
    state: &AppState,
    deadline: Deadline,
    id: i64,
    identity: &Identity,
) -> Result<(), ApiError> {
    let creator = state
        .db_call(deadline, "failed to check if post exists", move |db| db.get_post_creator(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("post doesn't exist".into()))?;

    if !identity.owns(&creator) {
        warn!("{} tried to modify post {} owned by {}", identity.login, id, creator);
        return Err(ApiError::Forbidden);
    }

    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_post(row: PostRow, liked_by: Vec<String>) -> Post {
    let created_at = parse_timestamp(&row.created_at, row.id);
    let updated_at = parse_timestamp(&row.updated_at, row.id);

    Post {
        id: row.id,
        created_by: row.created_by,
        title: row.title,
        text: row.text,
        likes: row.likes,
        liked_by,
        created_at,
        updated_at,
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" in UTC.
fn parse_timestamp(raw: &str, post_id: i64) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, timestamp::FORMAT)
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on post {}: {}", raw, post_id, e);
            DateTime::default()
        })
}
