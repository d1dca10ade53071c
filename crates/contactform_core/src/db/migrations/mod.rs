//! Versioned schema for the contact store.
//!
//! Each entry of `SCHEMA_STEPS` moves the database from `user_version` N to
//! N + 1. Steps are append-only: never edit one that has shipped.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[include_str!("0001_contact_messages.sql")];

/// Schema version a fully migrated database reports.
pub fn latest_version() -> u32 {
    u32::try_from(SCHEMA_STEPS.len()).unwrap_or(u32::MAX)
}

/// Runs every step above the stored version inside one transaction and
/// returns how many were applied.
///
/// A database newer than this build fails with `SchemaTooNew` and is not
/// modified.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let found = current_user_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = SCHEMA_STEPS.iter().zip(1..=supported).skip(found as usize);
    let tx = conn.transaction()?;
    let mut applied = 0;
    for (sql, version) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        applied += 1;
    }
    tx.commit()?;

    if applied > 0 {
        info!(
            "event=db_migrate module=db status=ok from_version={found} to_version={supported} steps={applied}"
        );
    }
    Ok(applied)
}

/// Schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
