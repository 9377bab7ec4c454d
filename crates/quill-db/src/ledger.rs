//! Reaction ledger: at most one like per (post, user), with `posts.likes`
//! kept equal to the number of reaction rows for the post.
//!
//! The counter update and the reaction insert/delete run in one transaction,
//! so a failure between the two statements rolls both back. The
//! `UNIQUE(post_id, liked_by)` constraint is the authoritative duplicate
//! guard; callers may pre-check with `has_reacted` for a friendlier error,
//! but a racing second `like_post` still fails here with `AlreadyLiked`.

use rusqlite::OptionalExtension;
use tracing::debug;

use crate::error::{DbError, is_unique_violation};
use crate::queries::post_exists;
use crate::{Database, Result};

impl Database {
    pub fn has_reacted(&self, post_id: i64, login: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM reactions WHERE post_id = ?1 AND liked_by = ?2",
                    rusqlite::params![post_id, login],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// NOT_LIKED -> LIKED.
    pub fn like_post(&self, post_id: i64, login: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !post_exists(&tx, post_id)? {
                return Err(DbError::PostNotFound(post_id));
            }

            tx.execute(
                "INSERT INTO reactions (post_id, liked_by) VALUES (?1, ?2)",
                rusqlite::params![post_id, login],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::AlreadyLiked(post_id)
                } else {
                    e.into()
                }
            })?;

            tx.execute(
                "UPDATE posts SET likes = likes + 1 WHERE id = ?1",
                [post_id],
            )?;

            tx.commit()?;
            debug!("{} liked post {}", login, post_id);
            Ok(())
        })
    }

    /// LIKED -> NOT_LIKED.
    pub fn unlike_post(&self, post_id: i64, login: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let removed = tx.execute(
                "DELETE FROM reactions WHERE post_id = ?1 AND liked_by = ?2",
                rusqlite::params![post_id, login],
            )?;
            if removed == 0 {
                return Err(DbError::NotLiked(post_id));
            }

            tx.execute(
                "UPDATE posts SET likes = likes - 1 WHERE id = ?1",
                [post_id],
            )?;

            tx.commit()?;
            debug!("{} unliked post {}", login, post_id);
            Ok(())
        })
    }

    /// Number of reaction rows for a post. Should always match `posts.likes`.
    pub fn count_reactions(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM reactions WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }
}
