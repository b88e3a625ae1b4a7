//! CLI entry point for StudyEngine.
//!
//! This binary provides the `studyengine` command with subcommands for
//! serving the HTTP API, planning a workflow from the terminal, inspecting
//! stored workflows and checking system status.

mod cli;
mod config;
mod helpers;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use studyengine_intent::{IntentResolver, NotesProcessor};
use studyengine_llm::client::API_KEY_ENV;
use studyengine_llm::{CompletionBackend, SharedLlm};
use studyengine_store::{Database, WorkflowStore};
use studyengine_web::{AppState, WebServer};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{build_context, init_tracing, render_checklist};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` is optional.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(db) = cli.db {
        config.store.path = db;
    }

    match cli.command {
        Commands::Serve {
            bind,
            port,
            files_root,
        } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if files_root.is_some() {
                config.files.root = files_root;
            }
            cmd_serve(config).await
        }
        Commands::Plan {
            prompt,
            notion,
            local,
            save,
            json,
        } => cmd_plan(config, &prompt.join(" "), &notion, &local, save, json).await,
        Commands::Show { id, json } => cmd_show(config, &id, json).await,
        Commands::Status => cmd_status(config).await,
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Lazily-constructed LLM handle; the API key is only needed on first use.
fn llm(config: &AppConfig) -> Arc<dyn CompletionBackend> {
    Arc::new(SharedLlm::new(config.llm_client_config()))
}

fn resolver(config: &AppConfig, llm: Arc<dyn CompletionBackend>) -> Result<IntentResolver> {
    Ok(IntentResolver::new(llm)
        .context("failed to build intent resolver")?
        .with_threshold(config.intent.confidence_threshold)
        .with_model(&config.llm.model))
}

async fn open_db(config: &AppConfig) -> Result<Database> {
    let path = config.store.path.clone();
    let db = Database::open_and_migrate(path.clone())
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    info!(path = %path.display(), "store initialized");
    Ok(db)
}

// ---------------------------------------------------------------------------
// Subcommand: serve
// ---------------------------------------------------------------------------

async fn cmd_serve(config: AppConfig) -> Result<()> {
    let db = open_db(&config).await?;
    let llm = llm(&config);
    let resolver = resolver(&config, Arc::clone(&llm))?;
    let processor = NotesProcessor::new(llm).with_model(&config.llm.model);

    if config.files.root.is_none() {
        tracing::warn!("no files root configured, /api/files/tree will fail");
    }

    let state = AppState::new(resolver, processor, db, config.web_config());
    WebServer::new(state)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("web server failed")
}

// ---------------------------------------------------------------------------
// Subcommand: plan
// ---------------------------------------------------------------------------

async fn cmd_plan(
    config: AppConfig,
    prompt: &str,
    notion: &[String],
    local: &[String],
    save: bool,
    json: bool,
) -> Result<()> {
    let resolver = resolver(&config, llm(&config))?;
    let context = build_context(notion, local);

    let plan = resolver
        .plan(prompt, context.as_ref())
        .await
        .context("could not plan a workflow")?;

    let workflow_id = if save {
        let store = WorkflowStore::new(open_db(&config).await?);
        Some(store.create(&plan.intent, &plan.workflow).await?.id)
    } else {
        None
    };

    if json {
        let out = serde_json::json!({
            "intent": plan.intent,
            "workflow": plan.workflow,
            "resolvedBy": plan.tier,
            "workflowId": workflow_id,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let subtitle = format!(
        "{} · {} · {:.0}% via {:?}",
        plan.workflow.estimated_time,
        plan.intent.source,
        plan.intent.confidence * 100.0,
        plan.tier
    );
    print!(
        "{}",
        render_checklist(&plan.workflow.title, &subtitle, &plan.workflow.steps)
    );
    if let Some(id) = workflow_id {
        println!("\nSaved as {id}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: show
// ---------------------------------------------------------------------------

async fn cmd_show(config: AppConfig, id: &str, json: bool) -> Result<()> {
    let store = WorkflowStore::new(open_db(&config).await?);
    let workflow = store
        .get(id)
        .await?
        .with_context(|| format!("workflow {id} not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workflow)?);
        return Ok(());
    }

    let created = chrono::DateTime::from_timestamp(workflow.created_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();
    let subtitle = format!("{} · {} · created {created}", workflow.status, workflow.source);
    print!(
        "{}",
        render_checklist(&workflow.title, &subtitle, &workflow.steps)
    );
    if let Some(link) = &workflow.output_link {
        println!("\nNotebookLM: {link}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

async fn cmd_status(config: AppConfig) -> Result<()> {
    println!("StudyEngine v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match open_db(&config).await {
        Ok(db) => {
            let version = db.schema_version().await?;
            let count = WorkflowStore::new(db).count().await?;
            println!("  Database:    {} (schema v{version})", config.store.path.display());
            println!("  Workflows:   {count}");
        }
        Err(e) => println!("  Database:    unavailable ({e:#})"),
    }

    let key = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        "set"
    } else {
        "missing (rule-matched prompts still work)"
    };
    println!("  LLM:         {} at {}", config.llm.model, config.llm.base_url);
    println!("  API key:     {key}");
    println!(
        "  Threshold:   {:.2}",
        config.intent.confidence_threshold
    );
    println!(
        "  Files root:  {}",
        config
            .files
            .root
            .as_ref()
            .map_or_else(|| "not configured".to_string(), |p| p.display().to_string())
    );
    println!(
        "  Server:      http://{}:{}",
        config.server.bind, config.server.port
    );
    Ok(())
}
