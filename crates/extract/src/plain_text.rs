//! Plain-text extraction: strict UTF-8 decoding.

use async_trait::async_trait;
use docchat_core::document::SourceKind;
use docchat_core::error::ExtractionError;
use docchat_core::extract::DocumentExtractor;
use tracing::debug;

/// Decodes uploads as UTF-8, rejecting invalid byte sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn decode(bytes: &[u8]) -> Result<String, ExtractionError> {
        // A leading byte-order mark is not part of the text.
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractionError::InvalidUtf8(e.to_string()))
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8], _kind: SourceKind) -> Result<String, ExtractionError> {
        let text = Self::decode(bytes)?;
        debug!(bytes = bytes.len(), chars = text.chars().count(), "Decoded plain-text document");
        Ok(text)
    }
}
