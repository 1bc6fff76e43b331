//! CompletionGateway trait — the abstraction over the remote LLM backend.
//!
//! A gateway takes the ordered message list assembled for one turn and
//! returns exactly one assistant reply or a typed failure. It knows nothing
//! about sessions, logs or documents; only the assembled request shape.
//!
//! Implementations: OpenAI-compatible endpoints (Groq, OpenAI, OpenRouter,
//! Ollama, ...) in `docchat-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::message::{Role, Turn};

/// One `{role, content}` entry of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role, turn.content.clone())
    }
}

/// The exact ordered message list sent upstream for one turn.
///
/// Built fresh every turn and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledRequest {
    pub messages: Vec<ChatMessage>,
}

impl AssembledRequest {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Total characters across all message contents.
    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

/// Token usage reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single non-streaming reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The assistant's reply text
    pub content: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: String::new(),
            usage: None,
        }
    }
}

/// The remote completion backend.
///
/// The session controller calls `complete()` once per user turn without
/// knowing which backend sits behind it. Model identifier, credentials and
/// timeouts belong to the implementation.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// A human-readable name for this backend (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Send the assembled messages and get one reply back.
    async fn complete(&self, request: &AssembledRequest) -> Result<Completion, GatewayError>;

    /// List the models the backend exposes.
    async fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> Result<bool, GatewayError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGateway;

    #[async_trait]
    impl CompletionGateway for EchoGateway {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &AssembledRequest) -> Result<Completion, GatewayError> {
            let last = request
                .messages
                .last()
                .ok_or_else(|| GatewayError::InvalidResponse("empty request".into()))?;
            Ok(Completion::text(last.content.clone()))
        }
    }

    #[tokio::test]
    async fn default_methods() {
        let gw = EchoGateway;
        assert!(gw.health_check().await.unwrap());
        assert!(gw.list_models().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_is_object_safe() {
        let gw: Box<dyn CompletionGateway> = Box::new(EchoGateway);
        let request = AssembledRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::new(Role::User, "ping")],
        };
        let reply = gw.complete(&request).await.unwrap();
        assert_eq!(reply.content, "ping");
    }

    #[test]
    fn chat_message_from_turn() {
        let turn = Turn::user("hello");
        let msg = ChatMessage::from(&turn);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn chat_message_wire_shape() {
        let json = serde_json::to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }

    #[test]
    fn total_chars_counts_characters() {
        let request = AssembledRequest {
            messages: vec![ChatMessage::system("ab"), ChatMessage::new(Role::User, "日本")],
        };
        assert_eq!(request.total_chars(), 4);
        assert_eq!(request.len(), 2);
    }
}
