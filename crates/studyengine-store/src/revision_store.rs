//! Revision schedule persistence.
//!
//! A schedule belongs to exactly one workflow.  Events are stored as a
//! JSON array; `next_review` is derived from the earliest day offset.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use studyengine_intent::{RevisionEvent, RevisionPlan};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

const SECONDS_PER_DAY: i64 = 86_400;

/// A persisted spaced-repetition schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRevisionSchedule {
    pub id: String,
    pub workflow_id: String,
    pub topic: String,
    pub events: Vec<RevisionEvent>,
    /// Unix seconds of the first session, if any.
    pub next_review: Option<i64>,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct RevisionScheduleStore {
    db: Database,
}

impl RevisionScheduleStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Attach `plan` to an existing workflow.
    #[instrument(skip(self, plan), fields(events = plan.events.len()))]
    pub async fn create(
        &self,
        workflow_id: &str,
        topic: &str,
        plan: &RevisionPlan,
    ) -> StoreResult<StoredRevisionSchedule> {
        let created_at = Utc::now().timestamp();
        let schedule = StoredRevisionSchedule {
            id: Uuid::now_v7().to_string(),
            workflow_id: workflow_id.to_string(),
            topic: topic.to_string(),
            events: plan.events.clone(),
            next_review: plan
                .first_day_offset()
                .map(|days| created_at + i64::from(days) * SECONDS_PER_DAY),
            created_at,
        };

        let events_json = serde_json::to_string(&schedule.events)?;
        let row = schedule.clone();
        self.db
            .execute(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM workflows WHERE id = ?1)",
                    rusqlite::params![row.workflow_id],
                    |r| r.get(0),
                )?;
                if !exists {
                    return Err(StoreError::NotFound {
                        entity: "workflow",
                        id: row.workflow_id,
                    });
                }

                conn.execute(
                    "INSERT INTO revision_schedules (id, workflow_id, topic, events, next_review, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        row.id,
                        row.workflow_id,
                        row.topic,
                        events_json,
                        row.next_review,
                        row.created_at,
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!(schedule_id = %schedule.id, workflow_id, "revision schedule stored");
        Ok(schedule)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> StoreResult<Option<StoredRevisionSchedule>> {
        let id = id.to_string();
        self.db
            .execute(move |conn| {
                let result = conn.query_row(
                    "SELECT id, workflow_id, topic, events, next_review, created_at \
                     FROM revision_schedules WHERE id = ?1",
                    rusqlite::params![id],
                    ScheduleRow::from_row,
                );
                match result {
                    Ok(row) => row.into_schedule().map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(StoreError::Sqlite(e)),
                }
            })
            .await
    }

    /// All schedules for a workflow, oldest first.
    #[instrument(skip(self))]
    pub async fn list_for_workflow(&self, workflow_id: &str) -> StoreResult<Vec<StoredRevisionSchedule>> {
        let workflow_id = workflow_id.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, workflow_id, topic, events, next_review, created_at \
                     FROM revision_schedules WHERE workflow_id = ?1 \
                     ORDER BY created_at ASC, id ASC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![workflow_id], ScheduleRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(ScheduleRow::into_schedule).collect()
            })
            .await
    }
}

struct ScheduleRow {
    id: String,
    workflow_id: String,
    topic: String,
    events: String,
    next_review: Option<i64>,
    created_at: i64,
}

impl ScheduleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workflow_id: row.get(1)?,
            topic: row.get(2)?,
            events: row.get(3)?,
            next_review: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_schedule(self) -> StoreResult<StoredRevisionSchedule> {
        Ok(StoredRevisionSchedule {
            id: self.id,
            workflow_id: self.workflow_id,
            topic: self.topic,
            events: serde_json::from_str(&self.events)?,
            next_review: self.next_review,
            created_at: self.created_at,
        })
    }
}
