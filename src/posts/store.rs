//! Post Storage
//! Mission: Persist feed posts with SQLite

use crate::posts::models::Post;
use crate::storage::{self, SharedConnection};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use tracing::debug;

/// Post storage with SQLite backend
pub struct PostStore {
    conn: SharedConnection,
}

impl PostStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let store = Self {
            conn: storage::open(db_path)?,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: storage::open_in_memory()?,
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(date DESC);
            CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);",
        )
        .context("Failed to create posts table")?;
        Ok(())
    }

    pub fn insert(&self, post: &Post) -> Result<()> {
        let doc = serde_json::to_string(post).context("Failed to encode post")?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO posts (id, user_id, date, doc) VALUES (?1, ?2, ?3, ?4)",
            params![post.id, post.user, storage::format_timestamp(&post.date), doc],
        )
        .context("Failed to insert post")?;

        debug!("Inserted post {} by {}", post.id, post.user);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let conn = self.conn.lock();
        load_post(&conn, id)
    }

    /// Newest first
    pub fn list(&self) -> Result<Vec<Post>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT doc FROM posts ORDER BY date DESC, rowid DESC")?;

        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list posts")?;

        Ok(posts)
    }

    /// Load, change, and rewrite one post as a single step.
    ///
    /// The lock is held and an immediate transaction is open for the whole
    /// read-modify-write, so concurrent edits to one post apply in turn.
    /// Returns `None` when the post does not exist.
    pub fn modify<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Post) -> T,
    ) -> Result<Option<(Post, T)>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin post update")?;

        let Some(mut post) = load_post(&tx, id)? else {
            return Ok(None);
        };
        let outcome = f(&mut post);
        write_post(&tx, &post)?;

        tx.commit().context("Failed to commit post update")?;
        Ok(Some((post, outcome)))
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])
            .context("Failed to delete post")?;
        Ok(rows > 0)
    }

    /// Remove every post authored by `user_id`; returns how many
    pub fn delete_by_user(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM posts WHERE user_id = ?1", params![user_id])
            .context("Failed to delete posts for user")
    }
}

fn load_post(conn: &Connection, id: &str) -> Result<Option<Post>> {
    conn.query_row(
        "SELECT doc FROM posts WHERE id = ?1",
        params![id],
        post_from_row,
    )
    .optional()
    .context("Failed to load post")
}

/// Rewrite the stored document (likes and comments change in place)
fn write_post(conn: &Connection, post: &Post) -> Result<()> {
    let doc = serde_json::to_string(post).context("Failed to encode post")?;
    conn.execute(
        "UPDATE posts SET doc = ?2 WHERE id = ?1",
        params![post.id, doc],
    )
    .context("Failed to update post")?;
    Ok(())
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let doc: String = row.get(0)?;
    storage::parse_document(0, &doc)
}
