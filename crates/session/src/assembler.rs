//! Request assembly: the exact message list sent upstream for one turn.
//!
//! Layout, in order:
//!
//! 1. **System prompt**, always present and always first
//! 2. **Document context**, a second System message wrapping the truncated
//!    document, present only when the session has non-empty document text
//! 3. **Conversation**, every logged turn oldest first
//!
//! # Determinism
//!
//! Assembly is a pure function of the log and the document store. The
//! document message is rendered fresh on every call and never written back
//! into the log, so calling `assemble` twice with unchanged inputs yields
//! identical output.

use docchat_config::SessionConfig;
use docchat_core::document::DocumentStore;
use docchat_core::gateway::{AssembledRequest, ChatMessage};
use docchat_core::message::ConversationLog;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_DOCUMENT_TEMPLATE: &str = "Reference Document (truncated): {document}";

/// Placeholder replaced by the truncated document text.
const DOCUMENT_PLACEHOLDER: &str = "{document}";

/// Builds [`AssembledRequest`]s. Stateless between calls; create one and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    system_prompt: String,
    document_template: String,
}

impl ContextAssembler {
    pub fn new(system_prompt: impl Into<String>, document_template: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            document_template: document_template.into(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.system_prompt, &config.document_template)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Render the document context message body for `text`.
    pub fn render_document(&self, text: &str) -> String {
        self.document_template.replace(DOCUMENT_PLACEHOLDER, text)
    }

    /// Assemble the request for the current state of `log` and `doc`.
    pub fn assemble(&self, log: &ConversationLog, doc: &DocumentStore) -> AssembledRequest {
        let document = doc.current().filter(|text| !text.is_empty());

        let mut messages = Vec::with_capacity(log.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));

        if let Some(text) = document {
            messages.push(ChatMessage::system(self.render_document(text)));
        }

        messages.extend(log.snapshot().map(ChatMessage::from));

        AssembledRequest { messages }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, DEFAULT_DOCUMENT_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::document::SourceKind;
    use docchat_core::message::{Role, Turn};

    fn log_with(turns: &[(Role, &str)]) -> ConversationLog {
        let mut log = ConversationLog::new();
        for (role, content) in turns {
            let turn = match role {
                Role::User => Turn::user(*content),
                Role::Assistant => Turn::assistant(*content),
                Role::System => Turn::system(*content),
            };
            log.append(turn).unwrap();
        }
        log
    }

    #[test]
    fn empty_inputs_yield_only_system_prompt() {
        let request = ContextAssembler::default().assemble(&ConversationLog::new(), &DocumentStore::default());
        assert_eq!(request.messages, vec![ChatMessage::system("You are a helpful assistant.")]);
    }

    #[test]
    fn document_context_is_second() {
        let log = log_with(&[(Role::User, "What does it say?")]);
        let mut doc = DocumentStore::default();
        doc.set_document("The sky is green.", SourceKind::PlainText);

        let request = ContextAssembler::default().assemble(&log, &doc);

        assert_eq!(request.len(), 3);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::System);
        assert_eq!(
            request.messages[1].content,
            "Reference Document (truncated): The sky is green."
        );
        assert_eq!(request.messages[2].content, "What does it say?");
    }

    #[test]
    fn empty_document_text_is_omitted() {
        let mut doc = DocumentStore::default();
        doc.set_document("", SourceKind::Pdf);

        let request = ContextAssembler::default().assemble(&ConversationLog::new(), &doc);
        assert_eq!(request.len(), 1);
    }

    #[test]
    fn exactly_one_document_message_iff_document_present() {
        let assembler = ContextAssembler::default();
        let log = log_with(&[(Role::User, "a"), (Role::Assistant, "b"), (Role::User, "c")]);
        let prefix = "Reference Document (truncated): ";

        let without = assembler.assemble(&log, &DocumentStore::default());
        assert_eq!(without.messages.iter().filter(|m| m.content.starts_with(prefix)).count(), 0);

        let mut doc = DocumentStore::default();
        doc.set_document("body", SourceKind::PlainText);
        let with = assembler.assemble(&log, &doc);
        assert_eq!(with.messages.iter().filter(|m| m.content.starts_with(prefix)).count(), 1);
        assert!(with.messages[1].content.starts_with(prefix));
    }

    #[test]
    fn log_turns_follow_in_order() {
        let log = log_with(&[
            (Role::User, "one"),
            (Role::Assistant, "two"),
            (Role::User, "three"),
        ]);
        let request = ContextAssembler::default().assemble(&log, &DocumentStore::default());

        let tail: Vec<(Role, &str)> = request.messages[1..]
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            tail,
            vec![(Role::User, "one"), (Role::Assistant, "two"), (Role::User, "three")]
        );
    }

    #[test]
    fn assembly_is_idempotent_and_leaves_log_alone() {
        let log = log_with(&[(Role::User, "q"), (Role::Assistant, "a")]);
        let mut doc = DocumentStore::default();
        doc.set_document("context", SourceKind::PlainText);
        let assembler = ContextAssembler::default();

        let first = assembler.assemble(&log, &doc);
        let second = assembler.assemble(&log, &doc);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn custom_prompt_and_template() {
        let assembler = ContextAssembler::new("Answer tersely.", "<doc>{document}</doc>");
        let mut doc = DocumentStore::new(4);
        doc.set_document("abcdefgh", SourceKind::PlainText);

        let request = assembler.assemble(&ConversationLog::new(), &doc);
        assert_eq!(request.messages[0].content, "Answer tersely.");
        assert_eq!(request.messages[1].content, "<doc>abcd</doc>");
    }

    #[test]
    fn placeholder_inside_document_is_not_expanded_again() {
        let assembler = ContextAssembler::default();
        assert_eq!(
            assembler.render_document("see {document}"),
            "Reference Document (truncated): see {document}"
        );
    }

    #[test]
    fn from_config_uses_configured_strings() {
        let config = SessionConfig {
            system_prompt: "Be precise.".into(),
            ..SessionConfig::default()
        };
        let assembler = ContextAssembler::from_config(&config);
        assert_eq!(assembler.system_prompt(), "Be precise.");
    }
}
