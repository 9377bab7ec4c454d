use serde::{Deserialize, Serialize};

use crate::models::Post;

// -- Envelope --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}

/// Every response body: `{"status": "OK"|"Error", "error"?: ..., ...fields}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Body for endpoints that only report success or failure.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: Status::Ok,
            error: None,
            body,
        }
    }
}

impl Envelope<Empty> {
    pub fn done() -> Self {
        Self::ok(Empty {})
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: Some(msg.into()),
            body: Empty {},
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of delete, like and unlike requests.
#[derive(Debug, Deserialize)]
pub struct PostIdRequest {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPostsResponse {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub posts: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}
