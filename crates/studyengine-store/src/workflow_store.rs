//! Workflow persistence.
//!
//! A workflow is stored once it has been resolved and populated, in the
//! `preview` status.  Execution and completion move it through the
//! status machine guarded by [`WorkflowStatus::can_transition`].

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use studyengine_intent::{ParsedIntent, PopulatedStep, PopulatedWorkflow, SourceType, WorkflowType};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of a stored workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Idle,
    Preview,
    Running,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 5] = [
        Self::Idle,
        Self::Preview,
        Self::Running,
        Self::Completed,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preview => "preview",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_targets(self) -> &'static [WorkflowStatus] {
        match self {
            Self::Idle => &[Self::Preview, Self::Running],
            Self::Preview => &[Self::Running, Self::Idle],
            Self::Running => &[Self::Completed, Self::Failed, Self::Idle],
            Self::Completed | Self::Failed => &[Self::Idle],
        }
    }

    pub fn can_transition(self, to: WorkflowStatus) -> bool {
        self.allowed_targets().contains(&to)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| StoreError::CorruptValue {
                column: "status",
                value: s.to_owned(),
            })
    }
}

/// A persisted workflow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkflow {
    /// Unique identifier (UUID v7).
    pub id: String,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    pub title: String,
    pub topic: String,
    pub source: String,
    pub source_type: SourceType,
    pub confidence: f64,
    pub status: WorkflowStatus,
    /// Populated steps, renumbered `1..=N`.
    pub steps: Vec<PopulatedStep>,
    /// Share link pasted back by the user on completion.
    pub output_link: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds, set on completion.
    pub completed_at: Option<i64>,
}

impl StoredWorkflow {
    /// The intent this workflow was created from.
    pub fn intent(&self) -> ParsedIntent {
        ParsedIntent {
            workflow_type: self.workflow_type,
            source: self.source.clone(),
            source_type: self.source_type,
            topic: self.topic.clone(),
            confidence: self.confidence,
        }
    }

    /// Look up a step by its renumbered id.
    pub fn step(&self, id: u32) -> Option<&PopulatedStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  WorkflowStore
// ═══════════════════════════════════════════════════════════════════════

const SELECT_COLUMNS: &str = "SELECT id, type, title, topic, source, source_type, confidence, status, steps, \
     output_link, created_at, completed_at FROM workflows";

/// CRUD and status transitions on stored workflows.
#[derive(Clone)]
pub struct WorkflowStore {
    db: Database,
}

impl WorkflowStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a populated workflow in the `preview` status.
    #[instrument(skip(self, intent, workflow), fields(workflow_type = %intent.workflow_type))]
    pub async fn create(
        &self,
        intent: &ParsedIntent,
        workflow: &PopulatedWorkflow,
    ) -> StoreResult<StoredWorkflow> {
        let stored = StoredWorkflow {
            id: Uuid::now_v7().to_string(),
            workflow_type: workflow.workflow_type,
            title: workflow.title.clone(),
            topic: intent.topic.clone(),
            source: intent.source.clone(),
            source_type: intent.source_type,
            confidence: intent.confidence,
            status: WorkflowStatus::Preview,
            steps: workflow.steps.clone(),
            output_link: None,
            created_at: Utc::now().timestamp(),
            completed_at: None,
        };

        let steps_json = serde_json::to_string(&stored.steps)?;
        let row = stored.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO workflows (id, type, title, topic, source, source_type, confidence, status, steps, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        row.id,
                        row.workflow_type.as_str(),
                        row.title,
                        row.topic,
                        row.source,
                        row.source_type.as_str(),
                        row.confidence,
                        row.status.as_str(),
                        steps_json,
                        row.created_at,
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!(workflow_id = %stored.id, steps = stored.steps.len(), "workflow stored");
        Ok(stored)
    }

    /// Fetch a workflow by ID, returning `None` if not found.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> StoreResult<Option<StoredWorkflow>> {
        let id = id.to_string();
        self.db.execute(move |conn| fetch(conn, &id)).await
    }

    /// List workflows, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<StoredWorkflow>> {
        self.db
            .execute(move |conn| {
                let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params![limit, offset], WorkflowRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(WorkflowRow::into_stored_workflow).collect()
            })
            .await
    }

    /// Total number of stored workflows.
    #[instrument(skip(self))]
    pub async fn count(&self) -> StoreResult<i64> {
        self.db
            .execute(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM workflows", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
    }

    /// Move a workflow to `running` on first execution access.
    ///
    /// Already running workflows are returned unchanged.
    #[instrument(skip(self))]
    pub async fn begin_execution(&self, id: &str) -> StoreResult<StoredWorkflow> {
        self.transition(id, WorkflowStatus::Running, None).await
    }

    /// Mark a running workflow completed and record its share link.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: &str, output_link: &str) -> StoreResult<StoredWorkflow> {
        self.transition(id, WorkflowStatus::Completed, Some(output_link.to_string()))
            .await
    }

    /// Mark a running workflow failed.
    #[instrument(skip(self))]
    pub async fn fail(&self, id: &str) -> StoreResult<StoredWorkflow> {
        self.transition(id, WorkflowStatus::Failed, None).await
    }

    /// Return a workflow to `idle` (cancel or dismiss).
    #[instrument(skip(self))]
    pub async fn reset(&self, id: &str) -> StoreResult<StoredWorkflow> {
        self.transition(id, WorkflowStatus::Idle, None).await
    }

    async fn transition(
        &self,
        id: &str,
        to: WorkflowStatus,
        output_link: Option<String>,
    ) -> StoreResult<StoredWorkflow> {
        let id = id.to_string();
        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                let mut workflow = fetch(&tx, &id)?.ok_or_else(|| StoreError::NotFound {
                    entity: "workflow",
                    id: id.clone(),
                })?;

                let from = workflow.status;
                if from == to && to == WorkflowStatus::Running {
                    return Ok(workflow);
                }
                if !from.can_transition(to) {
                    warn!(workflow_id = %id, %from, %to, "refused status transition");
                    return Err(StoreError::InvalidTransition { id, from, to });
                }

                let completed_at = (to == WorkflowStatus::Completed).then(|| Utc::now().timestamp());
                tx.execute(
                    "UPDATE workflows SET status = ?2, \
                     output_link = COALESCE(?3, output_link), \
                     completed_at = COALESCE(?4, completed_at) \
                     WHERE id = ?1",
                    rusqlite::params![id, to.as_str(), output_link, completed_at],
                )?;
                tx.commit()?;

                debug!(workflow_id = %id, %from, %to, "workflow status changed");
                workflow.status = to;
                if output_link.is_some() {
                    workflow.output_link = output_link;
                }
                if completed_at.is_some() {
                    workflow.completed_at = completed_at;
                }
                Ok(workflow)
            })
            .await
    }
}

fn fetch(conn: &rusqlite::Connection, id: &str) -> StoreResult<Option<StoredWorkflow>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let result = conn.query_row(&sql, rusqlite::params![id], WorkflowRow::from_row);
    match result {
        Ok(row) => row.into_stored_workflow().map(Some),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StoreError::Sqlite(e)),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Internal row mapping
// ═══════════════════════════════════════════════════════════════════════

/// Raw row data before enum parsing and JSON decoding.
struct WorkflowRow {
    id: String,
    workflow_type: String,
    title: String,
    topic: String,
    source: String,
    source_type: String,
    confidence: f64,
    status: String,
    steps: String,
    output_link: Option<String>,
    created_at: i64,
    completed_at: Option<i64>,
}

impl WorkflowRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workflow_type: row.get(1)?,
            title: row.get(2)?,
            topic: row.get(3)?,
            source: row.get(4)?,
            source_type: row.get(5)?,
            confidence: row.get(6)?,
            status: row.get(7)?,
            steps: row.get(8)?,
            output_link: row.get(9)?,
            created_at: row.get(10)?,
            completed_at: row.get(11)?,
        })
    }

    fn into_stored_workflow(self) -> StoreResult<StoredWorkflow> {
        let workflow_type = self
            .workflow_type
            .parse::<WorkflowType>()
            .map_err(|_| StoreError::CorruptValue {
                column: "type",
                value: self.workflow_type.clone(),
            })?;
        let source_type = self
            .source_type
            .parse::<SourceType>()
            .map_err(|_| StoreError::CorruptValue {
                column: "source_type",
                value: self.source_type.clone(),
            })?;

        Ok(StoredWorkflow {
            id: self.id,
            workflow_type,
            title: self.title,
            topic: self.topic,
            source: self.source,
            source_type,
            confidence: self.confidence,
            status: self.status.parse()?,
            steps: serde_json::from_str(&self.steps)?,
            output_link: self.output_link,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────
