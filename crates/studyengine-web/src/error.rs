//! HTTP error mapping.
//!
//! Every failure leaves the API as `{ "success": false, "error", "code" }`
//! with a status chosen from the underlying error.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use studyengine_intent::IntentError;
use studyengine_store::StoreError;

/// Machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseFailed,
    InvalidInput,
    OpenaiError,
    NotFound,
    Unknown,
}

/// Error type returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or parameters were malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A server-side precondition failed.
    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: ErrorCode,
}

impl ApiError {
    /// HTTP status and error code for this error.
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Unknown),
            Self::Intent(err) => match err {
                IntentError::EmptyPrompt
                | IntentError::EmptyContent
                | IntentError::UnknownProcessKind { .. } => {
                    (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput)
                }
                IntentError::Rejected => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ParseFailed),
                IntentError::Llm(_)
                | IntentError::MissingFunctionCall { .. }
                | IntentError::MalformedArguments { .. }
                | IntentError::InvalidWorkflowType { .. }
                | IntentError::InvalidSourceType { .. }
                | IntentError::EmptyCompletion
                | IntentError::InvalidRevisionPlan { .. } => {
                    (StatusCode::BAD_GATEWAY, ErrorCode::OpenaiError)
                }
                IntentError::UnknownWorkflowType { .. }
                | IntentError::UnknownSourceType { .. }
                | IntentError::EmptyWorkflow { .. }
                | IntentError::InvalidPattern { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Unknown)
                }
            },
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
                StoreError::InvalidTransition { .. } => (StatusCode::CONFLICT, ErrorCode::InvalidInput),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Unknown),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        Self::InvalidInput("Invalid JSON in request body.".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request refused");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
