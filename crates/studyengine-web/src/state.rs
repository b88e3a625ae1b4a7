//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across all request
//! handlers.  It holds the intent pipeline, the notes processor and the
//! stores.

use std::time::Instant;

use studyengine_intent::{IntentResolver, NotesProcessor};
use studyengine_store::{Database, RevisionScheduleStore, WorkflowStore};

use crate::WebConfig;

/// Shared state accessible from every Axum handler.
pub struct AppState {
    /// Rules-then-LLM intent resolution.
    pub resolver: IntentResolver,

    /// Single-shot notes formatting.
    pub processor: NotesProcessor,

    /// Database handle for health checks.
    pub db: Database,

    pub workflows: WorkflowStore,

    pub revisions: RevisionScheduleStore,

    /// Web server configuration.
    pub config: WebConfig,

    /// Used for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        resolver: IntentResolver,
        processor: NotesProcessor,
        db: Database,
        config: WebConfig,
    ) -> Self {
        Self {
            resolver,
            processor,
            workflows: WorkflowStore::new(db.clone()),
            revisions: RevisionScheduleStore::new(db.clone()),
            db,
            config,
            started_at: Instant::now(),
        }
    }
}
