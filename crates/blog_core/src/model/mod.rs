//! Domain model for blog posts.
//!
//! # Responsibility
//! - Define the canonical `Post` record and its create/update inputs.
//!
//! # Invariants
//! - Every persisted post is identified by a store-assigned `PostId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod post;
