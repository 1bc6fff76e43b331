//! The reference document attached to a session.
//!
//! A session holds at most one document. Uploading a new one replaces the
//! old one entirely; there is no history of prior uploads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExtractionError, Result, SessionError};

/// Default character budget for the document context.
pub const DEFAULT_MAX_DOCUMENT_LENGTH: usize = 5000;

/// The kind of file a document was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pdf,
    PlainText,
}

impl SourceKind {
    /// Map a declared MIME type to a source kind.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "text/plain" => Ok(Self::PlainText),
            _ => Err(SessionError::UnsupportedSourceKind(mime.to_string())),
        }
    }

    /// Infer the source kind from a file extension (`.pdf`, `.txt`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("txt") => Ok(Self::PlainText),
            _ => Err(SessionError::UnsupportedSourceKind(
                path.display().to_string(),
            )),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::PlainText => f.write_str("plain_text"),
        }
    }
}

/// An uploaded document and its truncated form.
///
/// The truncated text is stored as a cut point into `raw_text`, so it is a
/// prefix of the raw text by construction.
#[derive(Debug, Clone)]
pub struct DocumentReference {
    raw_text: String,
    cut: usize,
    source_kind: SourceKind,
    filename: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl DocumentReference {
    /// Build a reference keeping at most `max_chars` characters of `raw_text`.
    pub fn new(raw_text: String, source_kind: SourceKind, max_chars: usize) -> Self {
        let cut = raw_text
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(raw_text.len());
        Self {
            raw_text,
            cut,
            source_kind,
            filename: None,
            uploaded_at: Utc::now(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn truncated_text(&self) -> &str {
        &self.raw_text[..self.cut]
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Whether the raw text was longer than the budget.
    pub fn is_truncated(&self) -> bool {
        self.cut < self.raw_text.len()
    }

    pub fn raw_chars(&self) -> usize {
        self.raw_text.chars().count()
    }

    pub fn truncated_chars(&self) -> usize {
        self.truncated_text().chars().count()
    }
}

/// Single-slot store for a session's reference document.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    max_length: usize,
    document: Option<DocumentReference>,
}

impl DocumentStore {
    /// Create an empty store with the given character budget.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            document: None,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Replace the current document with `raw_text`, truncated to budget.
    pub fn set_document(
        &mut self,
        raw_text: impl Into<String>,
        source_kind: SourceKind,
    ) -> &DocumentReference {
        let doc = DocumentReference::new(raw_text.into(), source_kind, self.max_length);
        self.document.insert(doc)
    }

    /// Store the outcome of an extraction step.
    ///
    /// A failed extraction leaves the previous document in place.
    pub fn ingest(
        &mut self,
        extracted: std::result::Result<String, ExtractionError>,
        source_kind: SourceKind,
        filename: Option<&str>,
    ) -> Result<&DocumentReference> {
        let raw_text = extracted?;
        let mut doc = DocumentReference::new(raw_text, source_kind, self.max_length);
        if let Some(name) = filename {
            doc = doc.with_filename(name);
        }
        Ok(&*self.document.insert(doc))
    }

    /// Drop the current document, if any.
    pub fn clear(&mut self) {
        self.document = None;
    }

    /// The truncated text of the current document.
    pub fn current(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.truncated_text())
    }

    pub fn document(&self) -> Option<&DocumentReference> {
        self.document.as_ref()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_LENGTH)
    }
}
