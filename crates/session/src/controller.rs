//! The session controller: the only write path into a [`Session`].
//!
//! A user turn is recorded *before* the gateway is called and stays in the
//! log whatever the outcome. The assistant turn is recorded only on success,
//! so a failed completion leaves the log one turn longer, not two.

use std::sync::Arc;

use docchat_core::document::SourceKind;
use docchat_core::error::{GatewayError, Result, SessionError};
use docchat_core::extract::DocumentExtractor;
use docchat_core::gateway::{AssembledRequest, CompletionGateway};
use docchat_core::message::Turn;

use crate::assembler::ContextAssembler;
use crate::session::Session;
use crate::snapshot::SessionSnapshot;

/// Orchestrates turns and uploads for any number of sessions.
///
/// The controller holds no per-session state, so one instance is shared
/// across all sessions.
pub struct SessionController {
    assembler: ContextAssembler,
    gateway: Arc<dyn CompletionGateway>,
    extractor: Arc<dyn DocumentExtractor>,
}

impl SessionController {
    pub fn new(
        assembler: ContextAssembler,
        gateway: Arc<dyn CompletionGateway>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            assembler,
            gateway,
            extractor,
        }
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    pub fn gateway(&self) -> &Arc<dyn CompletionGateway> {
        &self.gateway
    }

    /// The request the next completion would see, minus the pending user turn.
    pub fn preview(&self, session: &Session) -> AssembledRequest {
        self.assembler.assemble(session.log(), session.document())
    }

    /// Record a user message, ask the gateway for a reply, and record it.
    ///
    /// Returns the assistant turn. On [`SessionError::CompletionFailed`]
    /// the user turn has already been logged and is kept.
    pub async fn handle_user_input(&self, session: &mut Session, text: &str) -> Result<Turn> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        session.append_turn(Turn::user(text))?;

        let request = self.preview(session);
        let completion = self.gateway.complete(&request).await?;

        if completion.content.trim().is_empty() {
            return Err(GatewayError::InvalidResponse("completion has no content".into()).into());
        }

        let reply = Turn::assistant(completion.content);
        session.append_turn(reply.clone())?;
        Ok(reply)
    }

    /// Extract `bytes` as `kind` and make the result the session's document.
    ///
    /// On failure the previous document, if any, stays current.
    pub async fn handle_document_upload(
        &self,
        session: &mut Session,
        bytes: &[u8],
        kind: SourceKind,
        filename: Option<&str>,
    ) -> Result<()> {
        let extracted = self.extractor.extract(bytes, kind).await;
        session.ingest_document(extracted, kind, filename)
    }

    /// Forget the session's document. The conversation is untouched.
    pub fn clear_document(&self, session: &mut Session) {
        session.clear_document();
    }

    /// Submit event: run a turn and render the result, error included.
    pub async fn on_submit(&self, session: &mut Session, text: &str) -> SessionSnapshot {
        match self.handle_user_input(session, text).await {
            Ok(_) => session.snapshot(),
            Err(e) => session.snapshot().with_error(&e),
        }
    }

    /// Upload event: ingest a document and render the result, error included.
    pub async fn on_upload(
        &self,
        session: &mut Session,
        bytes: &[u8],
        kind: SourceKind,
        filename: Option<&str>,
    ) -> SessionSnapshot {
        match self.handle_document_upload(session, bytes, kind, filename).await {
            Ok(()) => session.snapshot(),
            Err(e) => session.snapshot().with_error(&e),
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("assembler", &self.assembler)
            .field("gateway", &self.gateway.name())
            .finish_non_exhaustive()
    }
}
