//! Post use-case service.
//!
//! # Responsibility
//! - Provide the CRUD entry points for post callers.
//! - Map absence and affected-row counts to semantic errors.
//!
//! # Invariants
//! - `create` flushes exactly once after the repository stages the row.
//! - Any operation targeting an id that matches no row fails with
//!   `ServiceError::NotFound`.
//! - The service holds no state besides its collaborators.

use crate::model::post::{CreatePost, Post, PostId, UpdatePost};
use crate::repo::context::PersistenceContext;
use crate::repo::post_repo::PostRepository;
use crate::repo::RepoError;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for post use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// No post matches the id.
    NotFound(PostId),
    /// A single-row write touched more than one row.
    AmbiguousMatch { id: PostId, affected: usize },
    /// Persistence-layer failure, propagated unchanged.
    Repo(RepoError),
}

impl ServiceError {
    /// HTTP-style status code for transport layers.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AmbiguousMatch { .. } | Self::Repo(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::AmbiguousMatch { id, affected } => {
                write!(f, "write for post {id} affected {affected} rows, expected 1")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Post service facade over a row store and a persistence context.
pub struct PostService<R: PostRepository, C: PersistenceContext> {
    repo: R,
    context: C,
}

impl<R: PostRepository, C: PersistenceContext> PostService<R, C> {
    /// Creates a service using the provided collaborators.
    pub fn new(repo: R, context: C) -> Self {
        Self { repo, context }
    }

    /// Creates one post and commits it.
    ///
    /// Returns the post exactly as the repository produced it. When the
    /// commit fails, staged writes are discarded and the commit error is
    /// returned.
    pub fn create(&self, input: &CreatePost) -> ServiceResult<Post> {
        let post = self.repo.create(input)?;
        if let Err(err) = self.context.flush() {
            if let Err(discard_err) = self.context.discard() {
                warn!(
                    "event=post_create module=service status=error error_code=discard_failed error={discard_err}"
                );
            }
            return Err(err.into());
        }
        debug!("event=post_create module=service status=ok id={}", post.id);
        Ok(post)
    }

    /// Lists all posts. Empty store yields an empty vec.
    pub fn find_all(&self) -> ServiceResult<Vec<Post>> {
        Ok(self.repo.find_all()?)
    }

    /// Gets one post by id.
    pub fn find_one(&self, id: PostId) -> ServiceResult<Post> {
        self.repo.find_one(id)?.ok_or_else(|| {
            debug!("event=post_find module=service status=not_found id={id}");
            ServiceError::NotFound(id)
        })
    }

    /// Applies a partial update. Returns `true` when exactly one row changed.
    pub fn update(&self, id: PostId, input: &UpdatePost) -> ServiceResult<bool> {
        let affected = self.repo.native_update(id, input)?;
        expect_single_row("post_update", id, affected)
    }

    /// Deletes one post. Returns `true` when exactly one row was removed.
    pub fn delete(&self, id: PostId) -> ServiceResult<bool> {
        let affected = self.repo.native_delete(id)?;
        expect_single_row("post_delete", id, affected)
    }
}

fn expect_single_row(event: &str, id: PostId, affected: usize) -> ServiceResult<bool> {
    match affected {
        0 => {
            debug!("event={event} module=service status=not_found id={id}");
            Err(ServiceError::NotFound(id))
        }
        1 => {
            debug!("event={event} module=service status=ok id={id}");
            Ok(true)
        }
        affected => {
            warn!("event={event} module=service status=error id={id} affected={affected}");
            Err(ServiceError::AmbiguousMatch { id, affected })
        }
    }
}
