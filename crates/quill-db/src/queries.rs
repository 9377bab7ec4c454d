use rusqlite::{Connection, OptionalExtension};

use crate::error::{DbError, is_unique_violation};
use crate::models::{PostRow, ReactionRow, UserPosts, UserRow};
use crate::{Database, Result};

impl Database {
    // -- Users --

    /// Insert a user and return its row id. The UNIQUE constraint on `login`
    /// is what actually rules out duplicates.
    pub fn create_user(&self, login: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (login, password_hash) VALUES (?1, ?2)",
                (login, password_hash),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::UserExists(login.to_string())
                } else {
                    e.into()
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn user_exists(&self, login: &str) -> Result<bool> {
        self.with_conn(|conn| user_exists(conn, login))
    }

    pub fn get_user_by_login(&self, login: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_login(conn, login))
    }

    // -- Posts --

    pub fn create_post(&self, created_by: &str, title: &str, text: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (created_by, title, text) VALUES (?1, ?2, ?3)",
                (created_by, title, text),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn post_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| post_exists(conn, id))
    }

    /// Login of the post's author, or `None` when there is no such post.
    pub fn get_post_creator(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let creator = conn
                .query_row("SELECT created_by FROM posts WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(creator)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let post = conn
                .query_row(
                    "SELECT id, created_by, title, text, likes, created_at, updated_at
                     FROM posts WHERE id = ?1",
                    [id],
                    map_post_row,
                )
                .optional()?;
            Ok(post)
        })
    }

    /// Replace whichever of title/text is given and bump `updated_at`.
    pub fn update_post(&self, id: i64, title: Option<&str>, text: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE posts
                 SET title = COALESCE(?2, title),
                     text = COALESCE(?3, text),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, title, text],
            )?;
            if changed == 0 {
                return Err(DbError::PostNotFound(id));
            }
            Ok(())
        })
    }

    /// Delete a post. Its reactions go with it through ON DELETE CASCADE.
    pub fn remove_post(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(DbError::PostNotFound(id));
            }
            Ok(())
        })
    }

    /// Posts of `login` together with their reactions, or `None` for an
    /// unknown user. Everything is read inside one transaction.
    pub fn get_user_posts(&self, login: &str) -> Result<Option<UserPosts>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !user_exists(&tx, login)? {
                return Ok(None);
            }

            let posts = query_posts_by_user(&tx, login)?;
            let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
            let reactions = query_reactions_for_posts(&tx, &ids)?;

            tx.commit()?;
            Ok(Some(UserPosts { posts, reactions }))
        })
    }
}

fn user_exists(conn: &Connection, login: &str) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE login = ?1", [login], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// All posts written by `login`, newest first.
fn query_posts_by_user(conn: &Connection, login: &str) -> Result<Vec<PostRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, created_by, title, text, likes, created_at, updated_at
         FROM posts
         WHERE created_by = ?1
         ORDER BY id DESC",
    )?;

    let rows = stmt
        .query_map([login], map_post_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_reactions_for_posts(conn: &Connection, post_ids: &[i64]) -> Result<Vec<ReactionRow>> {
    if post_ids.is_empty() {
        return Ok(vec![]);
    }

    let placeholders: Vec<String> = (1..=post_ids.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT post_id, liked_by FROM reactions WHERE post_id IN ({}) ORDER BY rowid",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(post_ids), |row| {
            Ok(ReactionRow {
                post_id: row.get(0)?,
                liked_by: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub(crate) fn post_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM posts WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn query_user_by_login(conn: &Connection, login: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, login, password_hash, registered_at FROM users WHERE login = ?1",
    )?;

    let row = stmt
        .query_row([login], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                login: row.get(1)?,
                password_hash: row.get(2)?,
                registered_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        created_by: row.get(1)?,
        title: row.get(2)?,
        text: row.get(3)?,
        likes: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
