//! Document text extraction for DocChat.
//!
//! All extractors implement the `docchat_core::DocumentExtractor` trait.
//! [`KindExtractor`] dispatches on the declared source kind and is what the
//! session controller is normally wired with.

pub mod pdf;
pub mod plain_text;

use async_trait::async_trait;
use docchat_core::document::SourceKind;
use docchat_core::error::ExtractionError;
use docchat_core::extract::DocumentExtractor;

pub use pdf::PdfExtractor;
pub use plain_text::PlainTextExtractor;

/// Routes each upload to the extractor for its source kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct KindExtractor {
    pdf: PdfExtractor,
    plain_text: PlainTextExtractor,
}

impl KindExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentExtractor for KindExtractor {
    async fn extract(&self, bytes: &[u8], kind: SourceKind) -> Result<String, ExtractionError> {
        match kind {
            SourceKind::Pdf => self.pdf.extract(bytes, kind).await,
            SourceKind::PlainText => self.plain_text.extract(bytes, kind).await,
        }
    }
}
