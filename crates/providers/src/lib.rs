//! Completion gateway implementations for DocChat.
//!
//! All backends implement the `docchat_core::CompletionGateway` trait.
//! The router selects the correct one based on configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
