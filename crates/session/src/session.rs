//! A single chat session: one conversation log plus one document store.

use chrono::{DateTime, Utc};
use docchat_core::document::{DocumentStore, SourceKind};
use docchat_core::error::{ExtractionError, Result};
use docchat_core::message::{ConversationLog, SessionId, Turn};

use crate::snapshot::SessionSnapshot;

/// Per-session state.
///
/// Read access is public; mutation goes through
/// [`SessionController`](crate::SessionController) so every write path
/// enforces the same rules.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    log: ConversationLog,
    document: DocumentStore,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(max_document_length: usize) -> Self {
        Self::with_id(SessionId::new(), max_document_length)
    }

    pub fn with_id(id: SessionId, max_document_length: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            log: ConversationLog::new(),
            document: DocumentStore::new(max_document_length),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Render the current state for display.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(self)
    }

    // Writers below only touch `updated_at` once the write has succeeded.

    pub(crate) fn append_turn(&mut self, turn: Turn) -> Result<()> {
        self.log.append(turn)?;
        self.touch();
        Ok(())
    }

    pub(crate) fn ingest_document(
        &mut self,
        extracted: std::result::Result<String, ExtractionError>,
        kind: SourceKind,
        filename: Option<&str>,
    ) -> Result<()> {
        self.document.ingest(extracted, kind, filename)?;
        self.touch();
        Ok(())
    }

    pub(crate) fn clear_document(&mut self) {
        self.document.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(docchat_core::DEFAULT_MAX_DOCUMENT_LENGTH)
    }
}
