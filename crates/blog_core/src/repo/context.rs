//! Write-commit capability shared with repositories.
//!
//! # Responsibility
//! - Commit (or drop) writes staged by `PostRepository::create`.
//!
//! # Invariants
//! - `flush` and `discard` are no-ops when nothing is pending.

use super::RepoResult;
use log::debug;
use rusqlite::Connection;

/// Unit-of-work boundary over staged writes.
pub trait PersistenceContext {
    /// Commits buffered writes to the store.
    fn flush(&self) -> RepoResult<()>;
    /// Drops buffered writes without committing them.
    fn discard(&self) -> RepoResult<()>;
}

impl<T: PersistenceContext + ?Sized> PersistenceContext for &T {
    fn flush(&self) -> RepoResult<()> {
        (**self).flush()
    }

    fn discard(&self) -> RepoResult<()> {
        (**self).discard()
    }
}

/// SQLite persistence context.
///
/// Staged writes live in an open transaction on the shared connection.
pub struct SqlitePersistenceContext<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersistenceContext<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Returns whether a staged, uncommitted write is pending.
    pub fn has_pending_writes(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl PersistenceContext for SqlitePersistenceContext<'_> {
    fn flush(&self) -> RepoResult<()> {
        if !self.has_pending_writes() {
            return Ok(());
        }
        self.conn.execute_batch("COMMIT;")?;
        debug!("event=flush module=repo status=ok");
        Ok(())
    }

    fn discard(&self) -> RepoResult<()> {
        if !self.has_pending_writes() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK;")?;
        debug!("event=discard module=repo status=ok");
        Ok(())
    }
}
