use axum::{
    Json, Router, middleware,
    routing::{delete, get, patch, post, put},
};

use quill_types::api::{Empty, Envelope};

use crate::middleware::{require_auth, start_deadline};
use crate::state::AppState;
use crate::{auth, posts, reactions};

/// The full route table. Post mutation and reactions sit behind
/// `require_auth`; registration, login and post listing are public.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/user/{login}", get(posts::user_posts))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/post/create", post(posts::create_post))
        .route("/post/update", patch(posts::update_post))
        .route("/post/delete", delete(posts::remove_post))
        .route("/post/like", put(reactions::like))
        .route("/post/unlike", put(reactions::unlike))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), start_deadline))
        .with_state(state)
}

async fn health() -> Json<Envelope<Empty>> {
    Json(Envelope::done())
}
