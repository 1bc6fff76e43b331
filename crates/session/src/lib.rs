//! Chat sessions over a single reference document.
//!
//! Each turn follows the same path:
//!
//! 1. **Record** the user's message in the session's conversation log
//! 2. **Assemble** the outbound request: system prompt, document context
//!    (if any), then the whole log in order
//! 3. **Complete** via the configured gateway
//! 4. **Record** the reply, or surface the failure and keep the user's turn
//!
//! State is strictly per session: a [`Session`] owns one log and one
//! document store, and the [`SessionRegistry`] hands out sessions by id.

pub mod assembler;
pub mod controller;
pub mod registry;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod test_helpers;

pub use assembler::{ContextAssembler, DEFAULT_DOCUMENT_TEMPLATE, DEFAULT_SYSTEM_PROMPT};
pub use controller::SessionController;
pub use registry::{SessionHandle, SessionRegistry, SessionSummary};
pub use session::Session;
pub use snapshot::{DocumentSummary, ErrorNotice, NoticeKind, SessionSnapshot};
