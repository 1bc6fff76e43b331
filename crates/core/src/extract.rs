//! DocumentExtractor trait — turns uploaded bytes into plain text.
//!
//! Extraction is a collaborator concern: the session layer only needs text
//! or a distinguishable failure. An extractor must never report success
//! with empty text to paper over a file it could not read.

use async_trait::async_trait;

use crate::document::SourceKind;
use crate::error::ExtractionError;

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the text of `bytes`, interpreted as `kind`.
    ///
    /// For PDFs, pages are concatenated in page order. Plain text must be
    /// valid UTF-8.
    async fn extract(&self, bytes: &[u8], kind: SourceKind) -> Result<String, ExtractionError>;
}
