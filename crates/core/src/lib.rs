//! # DocChat Core
//!
//! Domain types, collaborator traits, and error definitions for DocChat.
//! This crate has **no framework dependencies**: it defines the session
//! model that every other crate builds against.
//!
//! ## Layout
//!
//! - [`message`]: turns and the append-only conversation log
//! - [`document`]: the single-slot, size-capped reference document
//! - [`gateway`]: the boundary to the remote completion backend
//! - [`extract`]: the boundary to document text extraction
//! - [`error`]: the error taxonomy shared by all of the above

pub mod document;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod message;

// Re-export key types at crate root for ergonomics
pub use document::{DEFAULT_MAX_DOCUMENT_LENGTH, DocumentReference, DocumentStore, SourceKind};
pub use error::{ExtractionError, GatewayError, Result, SessionError};
pub use extract::DocumentExtractor;
pub use gateway::{AssembledRequest, ChatMessage, Completion, CompletionGateway, Usage};
pub use message::{ConversationLog, Role, SessionId, Turn};
