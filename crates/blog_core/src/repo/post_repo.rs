//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide row-level CRUD over the `posts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `create` stages its insert; it becomes durable on the next flush.
//! - A failed `create` leaves no transaction it opened behind.
//! - `native_update`/`native_delete` write directly and never load entities.
//! - Listing order is `id ASC`.

use super::{ensure_connection_ready, RepoResult};
use crate::model::post::{CreatePost, Post, PostId, UpdatePost};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const POSTS_TABLE: &str = "posts";
const POSTS_COLUMNS: &[&str] = &["id", "title", "content", "writer"];

const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    writer
FROM posts";

/// Row-store interface for post CRUD operations.
pub trait PostRepository {
    /// Stages a new row and returns it with the store-assigned id.
    fn create(&self, input: &CreatePost) -> RepoResult<Post>;
    /// Returns every post in store order.
    fn find_all(&self) -> RepoResult<Vec<Post>>;
    /// Returns the post with `id`, or `None` when absent.
    fn find_one(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Applies `patch` to the row keyed by `id`; returns affected rows.
    fn native_update(&self, id: PostId, patch: &UpdatePost) -> RepoResult<usize>;
    /// Deletes the row keyed by `id`; returns affected rows.
    fn native_delete(&self, id: PostId) -> RepoResult<usize>;
}

impl<T: PostRepository + ?Sized> PostRepository for &T {
    fn create(&self, input: &CreatePost) -> RepoResult<Post> {
        (**self).create(input)
    }

    fn find_all(&self) -> RepoResult<Vec<Post>> {
        (**self).find_all()
    }

    fn find_one(&self, id: PostId) -> RepoResult<Option<Post>> {
        (**self).find_one(id)
    }

    fn native_update(&self, id: PostId, patch: &UpdatePost) -> RepoResult<usize> {
        (**self).native_update(id, patch)
    }

    fn native_delete(&self, id: PostId) -> RepoResult<usize> {
        (**self).native_delete(id)
    }
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, POSTS_TABLE, POSTS_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create(&self, input: &CreatePost) -> RepoResult<Post> {
        let opened_here = self.conn.is_autocommit();
        if opened_here {
            self.conn.execute_batch("BEGIN DEFERRED;")?;
        }

        let inserted = self.conn.execute(
            "INSERT INTO posts (title, content, writer) VALUES (?1, ?2, ?3);",
            params![
                input.title.as_str(),
                input.content.as_str(),
                input.writer.as_str()
            ],
        );
        if let Err(err) = inserted {
            // Only roll back a transaction opened by this call.
            if opened_here && !self.conn.is_autocommit() {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK;") {
                    warn!(
                        "event=post_insert module=repo status=error error_code=rollback_failed error={rollback_err}"
                    );
                }
            }
            return Err(err.into());
        }

        let id = self.conn.last_insert_rowid();
        debug!("event=post_insert module=repo status=staged id={id}");
        Ok(input.clone().into_post(id))
    }

    fn find_all(&self) -> RepoResult<Vec<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} ORDER BY id ASC;"))?;
        let posts = stmt
            .query_map([], parse_post_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn find_one(&self, id: PostId) -> RepoResult<Option<Post>> {
        let post = self
            .conn
            .query_row(
                &format!("{POST_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_post_row,
            )
            .optional()?;
        Ok(post)
    }

    fn native_update(&self, id: PostId, patch: &UpdatePost) -> RepoResult<usize> {
        if patch.is_empty() {
            let matched: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )?;
            return Ok(usize::try_from(matched).unwrap_or(0));
        }

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        for (column, value) in [
            ("title", &patch.title),
            ("content", &patch.content),
            ("writer", &patch.writer),
        ] {
            if let Some(value) = value {
                bind_values.push(Value::Text(value.clone()));
                assignments.push(format!("{column} = ?{}", bind_values.len()));
            }
        }
        bind_values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE posts SET {} WHERE id = ?{};",
            assignments.join(", "),
            bind_values.len()
        );
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        debug!("event=post_update module=repo status=ok id={id} affected={changed}");
        Ok(changed)
    }

    fn native_delete(&self, id: PostId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        debug!("event=post_delete module=repo status=ok id={id} affected={changed}");
        Ok(changed)
    }
}

fn parse_post_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        writer: row.get("writer")?,
    })
}
