//! Display-ready views of a session.
//!
//! The event handlers on [`SessionController`](crate::SessionController)
//! return a [`SessionSnapshot`] after every action, carrying the error (if
//! any) alongside the transcript so the shell can render both.

use chrono::{DateTime, Utc};
use docchat_core::document::{DocumentReference, SourceKind};
use docchat_core::error::SessionError;
use docchat_core::message::{SessionId, Turn};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    InvalidTurn,
    UnsupportedSourceKind,
    ExtractionFailed,
    EmptyInput,
    CompletionFailed,
    SessionNotFound,
}

impl From<&SessionError> for NoticeKind {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::InvalidTurn { .. } => Self::InvalidTurn,
            SessionError::UnsupportedSourceKind(_) => Self::UnsupportedSourceKind,
            SessionError::ExtractionFailed(_) => Self::ExtractionFailed,
            SessionError::EmptyInput => Self::EmptyInput,
            SessionError::CompletionFailed { .. } => Self::CompletionFailed,
            SessionError::SessionNotFound(_) => Self::SessionNotFound,
        }
    }
}

/// An error rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&SessionError> for ErrorNotice {
    fn from(err: &SessionError) -> Self {
        Self {
            kind: NoticeKind::from(err),
            message: err.to_string(),
        }
    }
}

/// Metadata about the current document, without its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub raw_chars: usize,
    pub truncated_chars: usize,
    pub truncated: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&DocumentReference> for DocumentSummary {
    fn from(doc: &DocumentReference) -> Self {
        Self {
            source_kind: doc.source_kind(),
            filename: doc.filename().map(str::to_string),
            raw_chars: doc.raw_chars(),
            truncated_chars: doc.truncated_chars(),
            truncated: doc.is_truncated(),
            uploaded_at: doc.uploaded_at(),
        }
    }
}

/// The full display state of one session after an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub turns: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorNotice>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            session_id: session.id().clone(),
            turns: session.log().snapshot().cloned().collect(),
            document: session.document().document().map(DocumentSummary::from),
            error: None,
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }

    pub fn with_error(mut self, err: &SessionError) -> Self {
        self.error = Some(ErrorNotice::from(err));
        self
    }

    /// The error category, if the action failed.
    pub fn error_kind(&self) -> Option<NoticeKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::error::GatewayError;

    #[test]
    fn notice_kinds_serialize_snake_case() {
        let json = serde_json::to_string(&NoticeKind::CompletionFailed).unwrap();
        assert_eq!(json, "\"completion_failed\"");
    }

    #[test]
    fn notice_carries_display_message() {
        let err = SessionError::from(GatewayError::Network("connection refused".into()));
        let notice = ErrorNotice::from(&err);
        assert_eq!(notice.kind, NoticeKind::CompletionFailed);
        assert!(notice.message.contains("connection refused"));
    }

    #[test]
    fn snapshot_of_fresh_session_omits_optional_fields() {
        let session = Session::default();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["turns"], serde_json::json!([]));
        assert!(json.get("document").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn with_error_sets_kind() {
        let snapshot = Session::default().snapshot().with_error(&SessionError::EmptyInput);
        assert_eq!(snapshot.error_kind(), Some(NoticeKind::EmptyInput));
    }
}
