//! Document schema migrations.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order.
//! - All pending steps run in one transaction; `PRAGMA user_version` is bumped
//!   after each step inside it.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Step {
    version: u32,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    sql: include_str!("0001_documents.sql"),
}];

/// Highest schema version this build can open.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let db_version = schema_version(conn)?;
    let pending = pending_steps(db_version)?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={db_version} to={}",
        latest_version()
    );
    Ok(())
}

fn pending_steps(db_version: u32) -> DbResult<&'static [Step]> {
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }
    let applied = STEPS.partition_point(|step| step.version <= db_version);
    Ok(&STEPS[applied..])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, STEPS};
    use crate::db::DbError;

    #[test]
    fn steps_are_strictly_increasing() {
        assert!(STEPS.windows(2).all(|pair| pair[0].version < pair[1].version));
        assert_eq!(STEPS[0].version, 1);
    }

    #[test]
    fn pending_steps_follow_recorded_version() {
        assert_eq!(pending_steps(0).unwrap().len(), STEPS.len());
        assert!(pending_steps(latest_version()).unwrap().is_empty());
        assert!(matches!(
            pending_steps(latest_version() + 1),
            Err(DbError::UnsupportedSchemaVersion { .. })
        ));
    }
}
