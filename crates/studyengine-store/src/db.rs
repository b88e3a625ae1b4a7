//! SQLite connection handle.
//!
//! One connection serves the whole process.  Statements never run on the
//! async executor: every closure handed to [`Database::execute`] is moved
//! to the blocking pool and runs with the connection locked.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migration;

/// Cloneable handle to the StudyEngine database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`, creating missing
    /// parent directories.
    ///
    /// Does blocking I/O.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::Migration {
                version: 0,
                message: format!("cannot create {}: {e}", dir.display()),
            })?;
        }

        info!(path = %path.display(), "opening database");
        Self::wrap(Connection::open(path)?)
    }

    /// A private in-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory database");
        Self::wrap(Connection::open_in_memory()?)
    }

    /// Open `path` on the blocking pool and bring the schema up to date.
    pub async fn open_and_migrate(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let db = tokio::task::spawn_blocking(move || Self::open(path)).await??;
        db.run_migrations().await?;
        Ok(db)
    }

    /// In-memory database with the full schema.
    pub async fn in_memory_migrated() -> StoreResult<Self> {
        let db = Self::open_in_memory()?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        self.execute(migration::run_all).await
    }

    /// Highest applied migration version.
    pub async fn schema_version(&self) -> StoreResult<u32> {
        self.execute(migration::current_version).await
    }

    /// Run `f` against the shared connection on the blocking pool.
    pub async fn execute<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.execute_mut(move |conn| f(conn)).await
    }

    /// Like [`execute`](Self::execute) but with `&mut Connection`, needed
    /// for `Connection::transaction`.
    pub async fn execute_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&inner)?;
            f(&mut guard)
        })
        .await?
    }

    fn wrap(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        // revision_schedules.workflow_id references workflows.id
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "busy_timeout", 5_000_i32)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(conn)),
        })
    }
}

fn lock(inner: &Mutex<Connection>) -> StoreResult<MutexGuard<'_, Connection>> {
    inner
        .lock()
        .map_err(|_| StoreError::TaskJoin("database mutex poisoned".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn foreign_keys_are_on() {
        let db = Database::open_in_memory().unwrap();
        let fk: i64 = db
            .execute(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[tokio::test]
    async fn execute_mut_supports_transactions() {
        let db = Database::in_memory_migrated().await.unwrap();
        let rolled_back: i64 = db
            .execute_mut(|conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO workflows (id, type, topic, source, source_type, steps, created_at) \
                     VALUES ('w', 'quiz', 't', 's', 'notion', '[]', 0)",
                    [],
                )?;
                drop(tx);
                Ok(conn.query_row("SELECT COUNT(*) FROM workflows", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(rolled_back, 0);
    }

    #[tokio::test]
    async fn migrated_db_reports_schema_version() {
        let db = Database::in_memory_migrated().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), migration::LATEST_VERSION);
    }

    #[tokio::test]
    async fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/study.db");
        let db = Database::open_and_migrate(path.clone()).await.unwrap();
        assert!(path.exists());
        assert_eq!(db.schema_version().await.unwrap(), migration::LATEST_VERSION);
    }
}
