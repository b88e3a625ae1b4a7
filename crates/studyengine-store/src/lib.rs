//! # studyengine-store
//!
//! SQLite persistence for StudyEngine.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  WorkflowStore          (workflows)      │
//! │  RevisionScheduleStore  (schedules, FK)  │
//! ├─────────────────────────────────────────┤
//! │  Database (rusqlite WAL, spawn_blocking) │
//! │  Migrations (versioned, transactional)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use studyengine_store::{Database, WorkflowStore};
//!
//! let db = Database::open_and_migrate("data/studyengine.db").await?;
//! let workflows = WorkflowStore::new(db.clone());
//! let stored = workflows.create(&intent, &populated).await?;
//! ```

pub mod db;
pub mod error;
pub mod migration;
pub mod revision_store;
pub mod workflow_store;

// ── re-exports ───────────────────────────────────────────────────────

pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use revision_store::{RevisionScheduleStore, StoredRevisionSchedule};
pub use workflow_store::{StoredWorkflow, WorkflowStatus, WorkflowStore};
