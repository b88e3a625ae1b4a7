//! REST API route handlers.
//!
//! Bodies and responses use camelCase field names.  Failures go through
//! [`ApiError`] so every error body has the same shape.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use studyengine_intent::{
    ContextPayload, ParsedIntent, PopulatedWorkflow, ProcessKind, ResolutionTier, StepExecution,
    execute_step, parse_revision_plan,
};
use studyengine_store::{StoredRevisionSchedule, StoredWorkflow, WorkflowStatus};

use crate::error::{ApiError, ApiResult};
use crate::files::{FileNode, scan_directory};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

type SharedState = State<Arc<AppState>>;

// ---------------------------------------------------------------------------
// POST /api/workflow/start
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartBody {
    pub prompt: Option<String>,
    pub context: Option<ContextPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub intent: ParsedIntent,
    pub workflow: PopulatedWorkflow,
    pub workflow_id: String,
    pub resolved_by: ResolutionTier,
}

/// Resolve the prompt, populate its template and store it as a preview.
#[instrument(skip_all)]
pub async fn start_workflow(
    State(state): SharedState,
    payload: Result<Json<StartBody>, JsonRejection>,
) -> ApiResult<Json<StartResponse>> {
    let Json(body) = payload?;
    let prompt = body
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Missing or empty 'prompt' in request body.".into()))?;

    let plan = state.resolver.plan(prompt, body.context.as_ref()).await?;
    let stored = state.workflows.create(&plan.intent, &plan.workflow).await?;

    info!(
        workflow_id = %stored.id,
        workflow = %plan.intent.workflow_type,
        tier = ?plan.tier,
        steps = plan.workflow.steps.len(),
        "workflow created"
    );

    Ok(Json(StartResponse {
        success: true,
        intent: plan.intent,
        workflow: plan.workflow,
        workflow_id: stored.id,
        resolved_by: plan.tier,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/workflow/execute
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBody {
    pub workflow_id: Option<String>,
    /// A JSON number; `1.0` addresses step 1.
    pub step_id: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub step: StepExecution,
}

/// Start (or continue) execution and return the requested step.
#[instrument(skip_all)]
pub async fn execute_workflow_step(
    State(state): SharedState,
    payload: Result<Json<ExecuteBody>, JsonRejection>,
) -> ApiResult<Json<ExecuteResponse>> {
    let Json(body) = payload?;
    let workflow_id = require_workflow_id(body.workflow_id)?;
    let step_id = body.step_id.filter(|id| *id >= 1.0).ok_or_else(|| {
        ApiError::InvalidInput("Missing or invalid 'stepId' (must be a positive number).".into())
    })?;

    let mut workflow = find_workflow(&state, &workflow_id).await?;
    if workflow.status == WorkflowStatus::Preview {
        workflow = state.workflows.begin_execution(&workflow_id).await?;
    }
    // Fractional ids pass validation but never name a step.
    let step = (step_id.fract() == 0.0 && step_id <= f64::from(u32::MAX))
        .then(|| workflow.step(step_id as u32))
        .flatten()
        .ok_or_else(|| ApiError::NotFound(format!("Step {step_id} not found in workflow.")))?;

    Ok(Json(ExecuteResponse {
        success: true,
        step: execute_step(step, &workflow.intent()),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/workflow/complete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    pub workflow_id: Option<String>,
    pub output_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub success: bool,
    pub workflow: StoredWorkflow,
}

/// Record the pasted share link and mark the workflow completed.
#[instrument(skip_all)]
pub async fn complete_workflow(
    State(state): SharedState,
    payload: Result<Json<CompleteBody>, JsonRejection>,
) -> ApiResult<Json<WorkflowResponse>> {
    let Json(body) = payload?;
    let workflow_id = require_workflow_id(body.workflow_id)?;
    let link = body
        .output_link
        .as_deref()
        .map(str::trim)
        .filter(|l| l.starts_with("http://") || l.starts_with("https://"))
        .ok_or_else(|| {
            ApiError::InvalidInput("Missing or invalid 'outputLink' (must be an http(s) URL).".into())
        })?;

    let workflow = state.workflows.complete(&workflow_id, link).await?;
    info!(workflow_id = %workflow.id, "workflow completed");

    Ok(Json(WorkflowResponse {
        success: true,
        workflow,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/workflow/process
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBody {
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Attach a revision schedule to this workflow.
    pub workflow_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub processed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<StoredRevisionSchedule>,
}

/// Run raw notes through the notes processor.
#[instrument(skip_all)]
pub async fn process_notes(
    State(state): SharedState,
    payload: Result<Json<ProcessBody>, JsonRejection>,
) -> ApiResult<Json<ProcessResponse>> {
    let Json(body) = payload?;
    let content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Missing or empty 'content' in request body.".into()))?;
    let kind: ProcessKind = body.kind.unwrap_or_default().parse()?;

    // Fail before the LLM round-trip if the target workflow is unknown.
    let target = match (&body.workflow_id, kind) {
        (Some(id), ProcessKind::RevisionSchedule) => Some(find_workflow(&state, id).await?),
        (Some(_), _) => {
            return Err(ApiError::InvalidInput(
                "'workflowId' is only accepted with type 'revision_schedule'.".into(),
            ));
        }
        (None, _) => None,
    };

    let processed = state.processor.process(&content, kind).await?;

    let schedule = match target {
        Some(workflow) => {
            let plan = parse_revision_plan(&processed)?;
            let schedule = state
                .revisions
                .create(&workflow.id, &workflow.topic, &plan)
                .await?;
            info!(
                workflow_id = %workflow.id,
                sessions = schedule.events.len(),
                "revision schedule attached"
            );
            Some(schedule)
        }
        None => None,
    };

    Ok(Json(ProcessResponse {
        success: true,
        processed,
        schedule,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/workflows
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub workflows: Vec<StoredWorkflow>,
    pub total: i64,
}

/// Recent workflows, newest first.
pub async fn list_workflows(
    State(state): SharedState,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let workflows = state.workflows.list(limit, offset).await?;
    let total = state.workflows.count().await?;
    Ok(Json(ListResponse {
        success: true,
        workflows,
        total,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/workflows/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDetail {
    pub success: bool,
    pub workflow: StoredWorkflow,
    pub revision_schedules: Vec<StoredRevisionSchedule>,
}

pub async fn get_workflow(
    State(state): SharedState,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowDetail>> {
    let workflow = find_workflow(&state, &id).await?;
    let revision_schedules = state.revisions.list_for_workflow(&id).await?;

    Ok(Json(WorkflowDetail {
        success: true,
        workflow,
        revision_schedules,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/files/tree
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub success: bool,
    pub tree: Vec<FileNode>,
}

/// Manifest of the configured local files directory.
pub async fn file_tree(State(state): SharedState) -> ApiResult<Json<TreeResponse>> {
    let root = state
        .config
        .files_root
        .clone()
        .ok_or_else(|| ApiError::Internal("LOCAL_FILES_DIR not configured in environment.".into()))?;

    let tree = tokio::task::spawn_blocking(move || scan_directory(&root))
        .await
        .map_err(|e| ApiError::Internal(format!("file scan task failed: {e}")))?
        .map_err(|e| {
            tracing::warn!(error = %e, "file tree scan failed");
            ApiError::Internal("Failed to scan files directory".into())
        })?;

    Ok(Json(TreeResponse {
        success: true,
        tree,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: bool,
    pub schema_version: Option<u32>,
    pub workflows: Option<i64>,
}

/// Basic health information.
pub async fn status(State(state): SharedState) -> Json<StatusResponse> {
    let schema_version = match state.db.schema_version().await {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            None
        }
    };
    let workflows = state.workflows.count().await.ok();
    let database = schema_version.is_some();

    Json(StatusResponse {
        status: if database { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
        schema_version,
        workflows,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_workflow_id(id: Option<String>) -> ApiResult<String> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Missing or invalid 'workflowId'.".into()))
}

async fn find_workflow(state: &AppState, id: &str) -> ApiResult<StoredWorkflow> {
    state
        .workflows
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Workflow \"{id}\" not found.")))
}
