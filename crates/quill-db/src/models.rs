/// Database row types. These map directly to SQLite rows and are kept
/// apart from the API models in quill-types.

pub struct UserRow {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub registered_at: String,
}

pub struct PostRow {
    pub id: i64,
    pub created_by: String,
    pub title: String,
    pub text: String,
    pub likes: i64,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ReactionRow {
    pub post_id: i64,
    pub liked_by: String,
}

/// A user's posts and the reactions on them, read in one transaction so the
/// reactions agree with each post's `likes`.
pub struct UserPosts {
    pub posts: Vec<PostRow>,
    pub reactions: Vec<ReactionRow>,
}
