//! Text extraction: one strategy per supported [`DocumentFormat`].
//!
//! ## Why a strategy per format?
//!
//! The set of formats is closed, and each needs an entirely different parser:
//! a charset decoder, a PDF content-stream walker, an OOXML zip reader. The
//! orchestrator picks the strategy once via [`DocumentFormat::strategy`] and
//! never branches on the format again.
//!
//! All parsers are synchronous and CPU-bound, and `pdf-extract` is known to
//! panic on some malformed files, so [`extract`] runs the strategy inside
//! `spawn_blocking` under a wall-clock timeout. A panic, a timeout and a parse
//! error all surface the same way: an extraction failure on the job.

use crate::error::ConversionError;
use crate::pipeline::detect::DocumentFormat;
use crate::pipeline::normalize::normalize_text;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use zip::ZipArchive;

/// Converts the raw bytes of one document format to plain text.
pub trait TextStrategy: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Decode `bytes`. `charset` is the declared charset, if any.
    fn extract(&self, bytes: &[u8], charset: Option<&str>) -> Result<String, ConversionError>;
}

impl DocumentFormat {
    /// The strategy for this format, `None` when unsupported.
    pub fn strategy(&self) -> Option<Box<dyn TextStrategy>> {
        match self {
            DocumentFormat::PlainText => Some(Box::new(PlainText)),
            DocumentFormat::Pdf => Some(Box::new(Pdf)),
            DocumentFormat::WordDocument => Some(Box::new(WordDocument)),
            DocumentFormat::Unsupported => None,
        }
    }
}

/// Read the stored file and extract normalised text from it.
///
/// Runs the parser on the blocking pool, bounded by `timeout`.
pub async fn extract(
    path: &Path,
    format: DocumentFormat,
    charset: Option<String>,
    timeout: Duration,
) -> Result<String, ConversionError> {
    let strategy = format
        .strategy()
        .ok_or_else(|| ConversionError::UnsupportedFormat {
            declared: format.label().to_string(),
        })?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ConversionError::extraction(format, format!("cannot read upload ({e})")))?;
    debug!("Extracting {} bytes as {}", bytes.len(), format);

    let task = tokio::task::spawn_blocking(move || {
        extract_bytes(strategy.as_ref(), &bytes, charset.as_deref())
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ConversionError::extraction(
            format,
            if join_err.is_panic() {
                "the parser crashed on this file".to_string()
            } else {
                format!("extraction task aborted: {join_err}")
            },
        )),
        Err(_) => Err(ConversionError::extraction(
            format,
            format!("timed out after {}s", timeout.as_secs_f32()),
        )),
    }
}

/// Synchronous core of [`extract`]: empty check, strategy, normalisation.
pub fn extract_bytes(
    strategy: &dyn TextStrategy,
    bytes: &[u8],
    charset: Option<&str>,
) -> Result<String, ConversionError> {
    if bytes.is_empty() {
        return Err(ConversionError::extraction(strategy.format(), "the file is empty"));
    }
    let raw = strategy.extract(bytes, charset)?;
    Ok(normalize_text(&raw))
}

// ── Plain text ───────────────────────────────────────────────────────────────

/// Decodes UTF-8 (default), US-ASCII or ISO-8859-1.
pub struct PlainText;

impl TextStrategy for PlainText {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    fn extract(&self, bytes: &[u8], charset: Option<&str>) -> Result<String, ConversionError> {
        let fail = |detail: String| ConversionError::extraction(DocumentFormat::PlainText, detail);
        match charset.unwrap_or("utf-8") {
            "utf-8" | "utf8" => String::from_utf8(bytes.to_vec()).map_err(|e| {
                fail(format!(
                    "invalid UTF-8 at byte {}",
                    e.utf8_error().valid_up_to()
                ))
            }),
            "us-ascii" | "ascii" => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(fail(format!("non-ASCII byte at offset {pos}"))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            "iso-8859-1" | "latin1" | "latin-1" => Ok(bytes.iter().map(|&b| b as char).collect()),
            other => Err(fail(format!("unsupported charset '{other}'"))),
        }
    }
}

// ── PDF ──────────────────────────────────────────────────────────────────────

/// Recoverable text via `pdf-extract`. Pages without text yield nothing.
pub struct Pdf;

impl TextStrategy for Pdf {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8], _charset: Option<&str>) -> Result<String, ConversionError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ConversionError::extraction(
                DocumentFormat::Pdf,
                "missing %PDF header",
            ));
        }
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ConversionError::extraction(DocumentFormat::Pdf, e.to_string())),
            Err(_) => Err(ConversionError::extraction(
                DocumentFormat::Pdf,
                "the parser crashed on this file",
            )),
        }
    }
}

// ── Word (OOXML) ─────────────────────────────────────────────────────────────

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph text from `word/document.xml`.
///
/// One line per `w:p`; `w:tab` becomes a tab and `w:br` a newline. Paragraphs
/// styled `Title` or `Heading*` are emitted as `# text` so the segmenter can
/// use them as slide titles. All other styling is dropped.
pub struct WordDocument;

impl TextStrategy for WordDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::WordDocument
    }

    fn extract(&self, bytes: &[u8], _charset: Option<&str>) -> Result<String, ConversionError> {
        let fail = |detail: String| ConversionError::extraction(DocumentFormat::WordDocument, detail);

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| fail(format!("not a valid .docx package ({e})")))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|_| fail(format!("package has no {DOCUMENT_PART}")))?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| fail(format!("cannot read {DOCUMENT_PART} ({e})")))?;

        paragraphs_from_xml(&xml).map_err(fail)
    }
}

fn paragraphs_from_xml(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len() / 4);
    let mut para = String::new();
    let mut in_para = false;
    let mut in_text = false;
    let mut heading = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    in_para = true;
                    heading = false;
                    para.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"pStyle" if in_para => {
                    heading = e.attributes().flatten().any(|a| {
                        local_name(a.key.as_ref()) == b"val" && is_heading_style(&a.value)
                    });
                }
                b"tab" if in_para => para.push('\t'),
                b"br" | b"cr" if in_para => para.push('\n'),
                // Self-closing paragraph: an empty line.
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().map_err(|e| format!("malformed text ({e})"))?;
                para.push_str(&text);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    in_para = false;
                    let line = para.trim();
                    if heading && !line.is_empty() {
                        out.push_str("# ");
                    }
                    out.push_str(line);
                    out.push('\n');
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed XML at byte {} ({e})", reader.buffer_position())),
            _ => {}
        }
    }

    Ok(out)
}

fn is_heading_style(value: &[u8]) -> bool {
    value.starts_with(b"Heading") || value == b"Title"
}

/// `w:p` → `p`.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DOCUMENT_PART, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn plain_text_charsets() {
        assert_eq!(PlainText.extract(b"Hello world", None).unwrap(), "Hello world");
        assert_eq!(
            PlainText.extract(&[0x63, 0x61, 0x66, 0xE9], Some("iso-8859-1")).unwrap(),
            "café"
        );
        assert!(PlainText.extract(&[0xFF, 0xFE, 0x00], None).is_err());
        assert!(PlainText.extract("café".as_bytes(), Some("us-ascii")).is_err());
        let err = PlainText.extract(b"x", Some("shift_jis")).unwrap_err();
        assert!(err.to_string().contains("shift_jis"));
    }

    #[test]
    fn empty_file_is_extraction_error() {
        let err = extract_bytes(&PlainText, b"", None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Extraction);
    }

    #[test]
    fn pdf_without_magic_is_rejected() {
        let err = Pdf.extract(b"PK\x03\x04 not a pdf", None).unwrap_err();
        assert!(err.to_string().contains("%PDF"));
    }

    #[test]
    fn truncated_pdf_is_extraction_error() {
        let err = Pdf.extract(b"%PDF-1.4\n1 0 obj\n<<", None).unwrap_err();
        assert!(matches!(err, ConversionError::Extraction { .. }));
    }

    #[test]
    fn docx_paragraphs_headings_and_tabs() {
        let bytes = docx_with_body(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Overview</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Rust &amp; </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>safety</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r></w:p>"#,
        ));
        let text = extract_bytes(&WordDocument, &bytes, None).unwrap();
        assert_eq!(text, "# Overview\nRust & safety\na\tb");
    }

    #[test]
    fn docx_without_document_part_fails() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = WordDocument.extract(&bytes, None).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn non_zip_docx_fails() {
        assert!(WordDocument.extract(b"plain bytes", None).is_err());
    }

    #[tokio::test]
    async fn extract_reads_file_and_normalises() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("in.txt");
        std::fs::write(&path, "\u{FEFF}Hello world\r\n\r\n\r\n\r\nBye  ").unwrap();
        let text = extract(&path, DocumentFormat::PlainText, None, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "Hello world\n\nBye");
    }

    #[tokio::test]
    async fn extract_unsupported_has_no_strategy() {
        let err = extract(
            Path::new("/nonexistent"),
            DocumentFormat::Unsupported,
            None,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat { .. }));
    }
}
