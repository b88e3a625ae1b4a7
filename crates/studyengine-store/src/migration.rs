//! Versioned schema.
//!
//! Each step is plain SQL tagged with a version number.  The `_migrations`
//! ledger records which steps a database has seen, so opening an existing
//! file only applies the steps added since it was last opened.

use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Version of the newest schema step.
pub const LATEST_VERSION: u32 = 2;

/// `(version, label, sql)`, ascending.  Never edit a shipped step; add one.
const STEPS: &[(u32, &str, &str)] = &[
    (
        1,
        "workflows and revision schedules",
        r"
        CREATE TABLE workflows (
            id           TEXT    PRIMARY KEY,
            type         TEXT    NOT NULL
                CHECK(type IN ('flashcards','quiz','summary','organize','audio','revision')),
            topic        TEXT    NOT NULL,
            source       TEXT    NOT NULL,
            source_type  TEXT    NOT NULL
                CHECK(source_type IN ('notion','local_files','downloads')),
            status       TEXT    NOT NULL DEFAULT 'preview'
                CHECK(status IN ('idle','preview','running','completed','failed')),
            steps        TEXT    NOT NULL,
            output_link  TEXT,
            created_at   INTEGER NOT NULL,
            completed_at INTEGER
        );
        CREATE INDEX idx_workflows_created ON workflows(created_at);

        CREATE TABLE revision_schedules (
            id           TEXT    PRIMARY KEY,
            workflow_id  TEXT    NOT NULL REFERENCES workflows(id),
            topic        TEXT    NOT NULL,
            events       TEXT    NOT NULL,
            next_review  INTEGER,
            created_at   INTEGER NOT NULL
        );
        CREATE INDEX idx_revision_schedules_workflow ON revision_schedules(workflow_id);
        ",
    ),
    (
        2,
        "workflow title and intent confidence",
        r"
        ALTER TABLE workflows ADD COLUMN title TEXT NOT NULL DEFAULT '';
        ALTER TABLE workflows ADD COLUMN confidence REAL NOT NULL DEFAULT 1.0;
        ",
    ),
];

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version    INTEGER PRIMARY KEY,
    label      TEXT    NOT NULL,
    applied_at INTEGER NOT NULL
)";

fn failed(version: u32, what: &str, err: rusqlite::Error) -> StoreError {
    StoreError::Migration {
        version,
        message: format!("{what}: {err}"),
    }
}

/// Bring `conn` up to [`LATEST_VERSION`].
///
/// Blocking.  [`Database`](crate::Database) runs it on the blocking pool.
pub fn run_all(conn: &Connection) -> StoreResult<()> {
    let from = current_version(conn)?;
    let todo = STEPS.iter().filter(|(version, ..)| *version > from);

    let mut applied = 0usize;
    for &(version, label, sql) in todo {
        info!(version, label, "migrating schema");
        if let Err(err) = apply_step(conn, version, label, sql) {
            warn!(version, %err, "schema step rolled back");
            return Err(err);
        }
        applied += 1;
    }

    if applied == 0 {
        debug!(version = from, "schema already current");
    } else {
        info!(from, to = LATEST_VERSION, applied, "schema migrated");
    }
    Ok(())
}

/// Highest version recorded in the ledger; 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.execute_batch(LEDGER_DDL)
        .map_err(|e| failed(0, "create ledger", e))?;
    conn.query_row("SELECT IFNULL(MAX(version), 0) FROM _migrations", [], |r| {
        r.get(0)
    })
    .map_err(|e| failed(0, "read ledger", e))
}

/// One step plus its ledger row, in a single immediate transaction.
/// Dropping the transaction on error rolls it back.
fn apply_step(conn: &Connection, version: u32, label: &str, sql: &str) -> StoreResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| failed(version, "begin", e))?;
    tx.execute_batch(sql)
        .map_err(|e| failed(version, "apply", e))?;
    tx.execute(
        "INSERT INTO _migrations (version, label, applied_at) VALUES (?1, ?2, ?3)",
        params![version, label, chrono::Utc::now().timestamp()],
    )
    .map_err(|e| failed(version, "record", e))?;
    tx.commit().map_err(|e| failed(version, "commit", e))
}
