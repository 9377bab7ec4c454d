use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use quill_api::{AppStateInner, router};
use quill_db::Database;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        token_secret: SECRET.into(),
        token_ttl: chrono::Duration::hours(4),
        request_timeout: Duration::from_secs(5),
    });
    router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_and_login(app: &Router, login: &str, password: &str) -> String {
    let creds = json!({ "login": login, "password": password });

    let (status, body) = send(app, "POST", "/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["id"].is_i64());

    let (status, body) = send(app, "POST", "/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_post(app: &Router, token: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/post/create",
        Some(token),
        Some(json!({ "title": "Hello", "text": "First post" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "OK");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn login_token_carries_login() {
    let app = app();
    let token = register_and_login(&app, "alice12345", "Passw0rd!").await;

    let claims = quill_auth::verify_token(&token, SECRET).unwrap();
    assert_eq!(claims.sub, "alice12345");
}

#[tokio::test]
async fn register_login_create_delete() {
    let app = app();
    let alice = register_and_login(&app, "alice12345", "Passw0rd!").await;
    let bob = register_and_login(&app, "bob1234567", "Hunter22!").await;

    let id = create_post(&app, &alice).await;

    let (status, body) = send(&app, "DELETE", "/post/delete", Some(&bob), Some(json!({ "id": id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": "Error", "error": "invalid user" }));

    let (status, body) = send(&app, "DELETE", "/post/delete", Some(&alice), Some(json!({ "id": id }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));

    let (status, body) = send(&app, "DELETE", "/post/delete", Some(&alice), Some(json!({ "id": id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "post doesn't exist");
}

#[tokio::test]
async fn register_rejects_bad_and_duplicate_credentials() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "login": "short", "password": "Passw0rd!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "login cannot be shorter than 8 characters");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "login": "alice12345", "password": "pass word!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password cannot contain spaces");

    register_and_login(&app, "alice12345", "Passw0rd!").await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "login": "alice12345", "password": "Another1!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user already exists");
}

#[tokio::test]
async fn login_failures() {
    let app = app();
    register_and_login(&app, "alice12345", "Passw0rd!").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "login": "nobody1234", "password": "Passw0rd!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user does not exist");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "login": "alice12345", "password": "WrongPass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid password");
}

#[tokio::test]
async fn protected_routes_need_valid_token() {
    let app = app();
    let post = json!({ "title": "t", "text": "x" });

    let (status, body) = send(&app, "POST", "/post/create", None, Some(post.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "Error");

    let (status, _) = send(&app, "POST", "/post/create", Some("garbage"), Some(post.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = quill_auth::issue_token("alice12345", "other-secret", chrono::Duration::hours(1)).unwrap();
    let (status, _) = send(&app, "POST", "/post/create", Some(&foreign), Some(post.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = quill_auth::issue_token("alice12345", SECRET, chrono::Duration::seconds(-60)).unwrap();
    let (status, body) = send(&app, "PUT", "/post/like", Some(&expired), Some(json!({ "id": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token has expired");
}

#[tokio::test]
async fn like_unlike_state_machine() {
    let app = app();
    let alice = register_and_login(&app, "alice12345", "Passw0rd!").await;
    let bob = register_and_login(&app, "bob1234567", "Hunter22!").await;
    let id = create_post(&app, &alice).await;
    let target = json!({ "id": id });

    let (status, _) = send(&app, "PUT", "/post/like", Some(&bob), Some(target.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "PUT", "/post/like", Some(&bob), Some(target.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("you have already liked post {}", id));

    let (status, _) = send(&app, "PUT", "/post/like", Some(&alice), Some(target.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/user/alice12345", None, None).await;
    assert_eq!(body["posts"][0]["likes"], 2);
    assert_eq!(body["posts"][0]["liked_by"], json!(["bob1234567", "alice12345"]));

    let (status, _) = send(&app, "PUT", "/post/unlike", Some(&bob), Some(target.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "PUT", "/post/unlike", Some(&bob), Some(target.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("you haven't liked post {}", id));

    let (_, body) = send(&app, "GET", "/user/alice12345", None, None).await;
    assert_eq!(body["posts"][0]["likes"], 1);
    assert_eq!(body["posts"][0]["liked_by"], json!(["alice12345"]));
}

#[tokio::test]
async fn like_missing_post() {
    let app = app();
    let bob = register_and_login(&app, "bob1234567", "Hunter22!").await;

    let (status, body) = send(&app, "PUT", "/post/like", Some(&bob), Some(json!({ "id": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": "Error", "error": "post doesn't exist" }));

    let (status, body) = send(&app, "PUT", "/post/unlike", Some(&bob), Some(json!({ "id": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "post doesn't exist");
}

#[tokio::test]
async fn update_post_rules() {
    let app = app();
    let alice = register_and_login(&app, "alice12345", "Passw0rd!").await;
    let bob = register_and_login(&app, "bob1234567", "Hunter22!").await;
    let id = create_post(&app, &alice).await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/post/update",
        Some(&alice),
        Some(json!({ "id": id, "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title or text must be filled in");

    let (status, body) = send(
        &app,
        "PATCH",
        "/post/update",
        Some(&bob),
        Some(json!({ "id": id, "title": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid user");

    let (status, _) = send(
        &app,
        "PATCH",
        "/post/update",
        Some(&alice),
        Some(json!({ "id": id, "text": " Edited text " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/user/alice12345", None, None).await;
    assert_eq!(body["posts"][0]["title"], "Hello");
    assert_eq!(body["posts"][0]["text"], "Edited text");
}

#[tokio::test]
async fn create_post_validation() {
    let app = app();
    let alice = register_and_login(&app, "alice12345", "Passw0rd!").await;

    let (status, body) = send(
        &app,
        "POST",
        "/post/create",
        Some(&alice),
        Some(json!({ "title": " ", "text": "body" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "post's title and text can't be empty");

    let (status, body) = send(&app, "POST", "/post/create", Some(&alice), Some(json!({ "title": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "failed to decode request");
}

#[tokio::test]
async fn user_posts_listing() {
    let app = app();

    let (status, body) = send(&app, "GET", "/user/nobody1234", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user doesn't exist");

    let alice = register_and_login(&app, "alice12345", "Passw0rd!").await;
    let (status, body) = send(&app, "GET", "/user/alice12345", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "user hasn't posted something yet");

    let first = create_post(&app, &alice).await;
    let second = create_post(&app, &alice).await;
    let (_, body) = send(&app, "GET", "/user/alice12345", None, None).await;
    let ids: Vec<i64> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(body["posts"][0]["created_by"], "alice12345");
    assert!(body.get("message").is_none());

    let created = body["posts"][0]["created_at"].as_str().unwrap();
    assert!(
        chrono::NaiveDateTime::parse_from_str(created, "%Y-%m-%d %H:%M:%S").is_ok(),
        "{created}"
    );
}

#[tokio::test]
async fn extra_body_fields_are_ignored() {
    let app = app();

    let creds = json!({ "login": "alice12345", "password": "Passw0rd!", "remember": true });
    let (status, body) = send(&app, "POST", "/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(&app, "POST", "/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let alice = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/post/create",
        Some(&alice),
        Some(json!({ "title": "Hello", "text": "First post", "tags": ["rust"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
