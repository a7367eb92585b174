//! Versioned schema steps for the post store.
//!
//! Each step is a SQL script tagged with the `user_version` it produces.
//! Steps newer than the stored version run in one transaction, in order.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// (resulting `user_version`, script)
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the schema version recorded on `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the stored version is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = schema_version(conn)?;
    let target = latest_version();
    if stored > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: target,
        });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _)| *version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, script) in pending {
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={stored} to_version={target}");
    Ok(())
}
