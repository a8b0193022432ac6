//! Schema bootstrap with destructive version policy.
//!
//! # Responsibility
//! - Create the note schema on a fresh database.
//! - Rebuild the whole store when the persisted version does not match.
//!
//! # Invariants
//! - After `apply_schema` returns `Ok`, `PRAGMA user_version` equals
//!   `SCHEMA_VERSION`.
//! - Schema creation and rebuild run inside one transaction.

use crate::db::DbResult;
use log::warn;
use rusqlite::{Connection, Transaction};

/// Version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

/// Table backing the `Note` entity.
pub const NOTE_TABLE: &str = "note";

const SCHEMA_SQL: &str = include_str!("0001_init.sql");

/// What `apply_schema` did to reach the current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Database was already at `SCHEMA_VERSION`.
    UpToDate,
    /// Fresh database; schema created.
    Created,
    /// Database carried another version; all tables dropped and recreated.
    Rebuilt { from_version: u32 },
}

/// Brings the connection to `SCHEMA_VERSION`.
///
/// Any version other than `0` (fresh) or `SCHEMA_VERSION` triggers a
/// destructive rebuild. Data loss is accepted on version change.
pub fn apply_schema(conn: &mut Connection) -> DbResult<SchemaOutcome> {
    let current = current_user_version(conn)?;
    if current == SCHEMA_VERSION {
        return Ok(SchemaOutcome::UpToDate);
    }

    let tx = conn.transaction()?;
    let outcome = if current == 0 {
        SchemaOutcome::Created
    } else {
        warn!(
            "event=schema_rebuild module=db status=start from_version={} to_version={}",
            current, SCHEMA_VERSION
        );
        drop_user_tables(&tx)?;
        SchemaOutcome::Rebuilt {
            from_version: current,
        }
    };

    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(outcome)
}

fn drop_user_tables(tx: &Transaction<'_>) -> DbResult<()> {
    let tables = {
        let mut stmt = tx.prepare(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table'
               AND name NOT LIKE 'sqlite_%';",
        )?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get::<_, String>(0)?);
        }
        names
    };

    for table in tables {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\";", table.replace('"', "\"\"")))?;
    }

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
