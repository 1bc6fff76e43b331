//! Error types for the DocChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum; `SessionError` is
//! what the session layer surfaces to the presentation shell.

use thiserror::Error;

use crate::message::{Role, SessionId};

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by session operations.
///
/// None of these are retried by the session layer; all of them are meant
/// for direct display.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid turn: {role} messages must have non-empty content")]
    InvalidTurn { role: Role },

    #[error("Unsupported document type: {0} (expected a PDF or plain-text file)")]
    UnsupportedSourceKind(String),

    #[error("Document extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractionError),

    #[error("Message is empty")]
    EmptyInput,

    #[error("Completion failed: {cause}")]
    CompletionFailed {
        #[source]
        cause: GatewayError,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}

impl From<GatewayError> for SessionError {
    fn from(cause: GatewayError) -> Self {
        Self::CompletionFailed { cause }
    }
}

/// Failures of the remote completion backend.
///
/// The session layer never branches on the variant; it only wraps it in
/// [`SessionError::CompletionFailed`].
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),
}

/// Failures of the document text extraction step.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("extraction aborted: {0}")]
    Internal(String),
}
