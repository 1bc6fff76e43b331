//! PDF extraction via `pdf-extract`.
//!
//! Parsing runs on the blocking thread pool. `pdf-extract` panics on some
//! malformed font dictionaries; the panic unwinds out of the blocking task
//! and is reported as [`ExtractionError::Internal`]. This needs the default
//! `panic = "unwind"` strategy in every profile the server is built with.

use async_trait::async_trait;
use docchat_core::document::SourceKind;
use docchat_core::error::ExtractionError;
use docchat_core::extract::DocumentExtractor;
use tracing::{debug, warn};

/// Extracts the text of every page, in page order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    #[cfg(feature = "pdf")]
    fn extract_blocking(bytes: &[u8]) -> Result<String, ExtractionError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ExtractionError::Pdf("missing %PDF header".into()));
        }
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
        if pages.is_empty() {
            return Err(ExtractionError::Pdf("document has no pages".into()));
        }
        debug!(pages = pages.len(), "Parsed PDF pages");
        Ok(pages.concat())
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_blocking(_bytes: &[u8]) -> Result<String, ExtractionError> {
        Err(ExtractionError::Pdf(
            "PDF support was not compiled in (enable the `pdf` feature)".into(),
        ))
    }
}

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8], _kind: SourceKind) -> Result<String, ExtractionError> {
        let owned = bytes.to_vec();
        let size = owned.len();

        let text = tokio::task::spawn_blocking(move || Self::extract_blocking(&owned))
            .await
            .map_err(|e| {
                warn!(error = %e, "PDF extraction task failed");
                ExtractionError::Internal(e.to_string())
            })??;

        debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}
