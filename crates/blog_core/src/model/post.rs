//! Post domain model.
//!
//! # Responsibility
//! - Define the persisted `Post` record and its write inputs.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `title`, `content` and `writer` are always present on a persisted post.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a post (SQLite rowid).
pub type PostId = i64;

/// Persisted blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Author display name.
    pub writer: String,
}

/// Input for creating a post. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub writer: String,
}

impl CreatePost {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        writer: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            writer: writer.into(),
        }
    }

    /// Builds the persisted shape once the store has assigned `id`.
    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            writer: self.writer,
        }
    }
}

/// Partial update input. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
}

impl UpdatePost {
    /// Returns whether no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.writer.is_none()
    }

    /// Applies supplied fields onto `post` in place. `id` is never touched.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(writer) = &self.writer {
            post.writer = writer.clone();
        }
    }
}

impl From<CreatePost> for UpdatePost {
    fn from(value: CreatePost) -> Self {
        Self {
            title: Some(value.title),
            content: Some(value.content),
            writer: Some(value.writer),
        }
    }
}
