//! HTTP surface for StudyEngine.
//!
//! An axum server exposing the intent pipeline and workflow persistence:
//!
//! - `POST /api/workflow/start` resolves a prompt and stores a preview.
//! - `POST /api/workflow/execute` returns the execution view of a step.
//! - `POST /api/workflow/complete` records the share link.
//! - `POST /api/workflow/process` runs the notes processor.
//! - `GET /api/workflows`, `GET /api/workflows/{id}` browse stored workflows.
//! - `GET /api/files/tree` lists local study material.
//! - `GET /api/status` reports health.

use std::path::PathBuf;

pub mod api;
pub mod error;
pub mod files;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use server::{WebServer, router};
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
    /// Root of the local study-material tree, if any.
    pub files_root: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 3000,
            files_root: None,
        }
    }
}
