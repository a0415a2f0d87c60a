//! Format detection: decide which extractor handles an upload.
//!
//! The declared mimetype wins when it names one of the three supported
//! formats. Browsers and HTTP clients often send `application/octet-stream`
//! or nothing at all, so a generic or missing mimetype falls back to the
//! file extension. A *specific* mimetype we do not support (`application/zip`,
//! `image/png`, …) is never second-guessed by the extension: the upload is
//! rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Mimetypes that carry no format information.
const GENERIC_MIMES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// Closed set of document formats the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    WordDocument,
    Unsupported,
}

impl DocumentFormat {
    /// Human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "plain text",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::WordDocument => "Word",
            DocumentFormat::Unsupported => "unsupported",
        }
    }

    /// Canonical mimetype, `None` for [`DocumentFormat::Unsupported`].
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            DocumentFormat::PlainText => Some(MIME_TEXT),
            DocumentFormat::Pdf => Some(MIME_PDF),
            DocumentFormat::WordDocument => Some(MIME_DOCX),
            DocumentFormat::Unsupported => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentFormat::Unsupported)
    }

    fn from_mime(essence: &str) -> Option<Self> {
        match essence {
            MIME_TEXT => Some(DocumentFormat::PlainText),
            MIME_PDF => Some(DocumentFormat::Pdf),
            MIME_DOCX => Some(DocumentFormat::WordDocument),
            _ => None,
        }
    }

    fn from_extension(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase());
        match ext.as_deref() {
            Some("txt") => DocumentFormat::PlainText,
            Some("pdf") => DocumentFormat::Pdf,
            Some("docx") => DocumentFormat::WordDocument,
            _ => DocumentFormat::Unsupported,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an upload from its declared mimetype and filename.
pub fn detect(declared_mime_type: Option<&str>, filename: &str) -> DocumentFormat {
    let essence = declared_mime_type.map(mime_essence).unwrap_or_default();

    if let Some(format) = DocumentFormat::from_mime(&essence) {
        return format;
    }
    if essence.is_empty() || GENERIC_MIMES.contains(&essence.as_str()) {
        return DocumentFormat::from_extension(filename);
    }
    DocumentFormat::Unsupported
}

/// The `charset=` parameter of a mimetype, lower-cased and unquoted.
pub fn charset(declared_mime_type: Option<&str>) -> Option<String> {
    declared_mime_type?
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, v)| v.trim().trim_matches('"').to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

/// `Text/Plain; charset=UTF-8` → `text/plain`.
fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
