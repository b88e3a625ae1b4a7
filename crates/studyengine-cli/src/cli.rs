//! CLI argument definitions for StudyEngine.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// StudyEngine -- turn study requests into guided NotebookLM checklists.
#[derive(Parser)]
#[command(
    name = "studyengine",
    version,
    about = "StudyEngine -- study requests to guided checklists",
    long_about = "Resolves a free-text study request into a workflow (flashcards, quiz, \
                  summary, organize, audio, revision) and walks you through it step by step."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Default log level when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Override the SQLite database path.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Address to bind the HTTP server to.
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on.
        #[arg(long, short)]
        port: Option<u16>,

        /// Root of the local study-material tree.
        #[arg(long)]
        files_root: Option<PathBuf>,
    },

    /// Resolve a prompt and print the populated checklist.
    Plan {
        /// The study request, e.g. "make flashcards from my OS notes".
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Title of a dragged Notion page (repeatable).
        #[arg(long = "notion", value_name = "TITLE")]
        notion: Vec<String>,

        /// Title of a dragged local file (repeatable).
        #[arg(long = "local", value_name = "TITLE")]
        local: Vec<String>,

        /// Persist the workflow as a preview.
        #[arg(long)]
        save: bool,

        /// Print JSON instead of a checklist.
        #[arg(long)]
        json: bool,
    },

    /// Show a stored workflow.
    Show {
        /// Workflow id.
        id: String,

        /// Print JSON instead of a checklist.
        #[arg(long)]
        json: bool,
    },

    /// Show current system status.
    Status,
}
