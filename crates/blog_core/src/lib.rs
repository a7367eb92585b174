//! Core domain logic for the blog backend.
//! This crate owns the post CRUD contract and its SQLite persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::post::{CreatePost, Post, PostId, UpdatePost};
pub use repo::context::{PersistenceContext, SqlitePersistenceContext};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::{RepoError, RepoResult};
pub use service::post_service::{PostService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
