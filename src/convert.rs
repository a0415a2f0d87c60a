//! One-shot conversion entry points.
//!
//! ## Why a private orchestrator?
//!
//! The CLI and library callers want "file in, deck out" without running a
//! service. Each call builds its own [`Orchestrator`] over a scratch
//! [`tempfile::TempDir`], so the exact same state machine, cleanup and
//! error taxonomy apply as in the HTTP service, and nothing is left behind
//! when the call returns.

use crate::config::ServiceConfig;
use crate::error::Doc2DeckError;
use crate::options::ConversionOptions;
use crate::orchestrator::{Orchestrator, Upload};
use crate::output::DeckArtifact;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

/// Convert a local document and write the deck to `output`.
///
/// The deck is written to a sibling temp file and renamed into place, so
/// `output` never holds a partial deck.
///
/// # Errors
/// - [`Doc2DeckError::InputReadFailed`] if `input` cannot be read
/// - [`Doc2DeckError::Rejected`] for oversized or unsupported input
/// - [`Doc2DeckError::JobFailed`] when a stage fails
/// - [`Doc2DeckError::OutputWriteFailed`] if `output` cannot be written
pub async fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: ConversionOptions,
    config: &ServiceConfig,
) -> Result<DeckArtifact, Doc2DeckError> {
    let input = input.as_ref();
    let path = output.as_ref();
    info!("Converting {} -> {}", input.display(), path.display());

    let bytes = tokio::fs::read(input)
        .await
        .map_err(|source| Doc2DeckError::InputReadFailed {
            path: input.to_path_buf(),
            source,
        })?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (_scratch, artifact) = run_scratch(
        Upload::new(filename, None, bytes).with_options(options),
        config,
    )
    .await?;

    let write_err = |source: std::io::Error| Doc2DeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let tmp_path = path.with_extension("pptx.tmp");
    if let Err(e) = tokio::fs::copy(&artifact.path, &tmp_path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(DeckArtifact {
        path: path.to_path_buf(),
        filename: artifact.filename,
        slide_count: artifact.slide_count,
    })
}

/// Convert an in-memory document and return the `.pptx` bytes.
///
/// # Example
/// ```rust,no_run
/// use doc2deck::{convert_bytes, ConversionOptions, ServiceConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let deck = convert_bytes(
///     "notes.txt",
///     Some("text/plain"),
///     b"Hello world".to_vec(),
///     ConversionOptions::default(),
///     &ServiceConfig::default(),
/// )
/// .await?;
/// std::fs::write("notes.pptx", deck)?;
/// # Ok(())
/// # }
/// ```
pub async fn convert_bytes(
    filename: &str,
    mime_type: Option<&str>,
    bytes: Vec<u8>,
    options: ConversionOptions,
    config: &ServiceConfig,
) -> Result<Vec<u8>, Doc2DeckError> {
    let upload =
        Upload::new(filename, mime_type.map(str::to_string), bytes).with_options(options);
    let (_scratch, artifact) = run_scratch(upload, config).await?;
    tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| Doc2DeckError::Internal(format!("cannot read generated deck: {e}")))
}

/// Run one job on a throwaway storage area.
///
/// The returned [`TempDir`] owns the deck; drop it once the deck is copied.
async fn run_scratch(
    upload: Upload,
    config: &ServiceConfig,
) -> Result<(TempDir, DeckArtifact), Doc2DeckError> {
    let scratch = tempfile::Builder::new()
        .prefix("doc2deck-")
        .tempdir()
        .map_err(|e| Doc2DeckError::Internal(format!("tempdir: {e}")))?;

    let mut config = config.clone();
    config.storage_root = scratch.path().to_path_buf();
    let orchestrator = Orchestrator::new(config);

    let id = orchestrator.intake(upload).await?;
    orchestrator.run(id).await?;
    let artifact = orchestrator.retrieve(id).await?;
    Ok((scratch, artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn convert_file_writes_deck_atomically() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("My Notes.txt");
        std::fs::write(&input, "Hello world").unwrap();
        let output = tmp.path().join("out/deck.pptx");

        let artifact = convert_file(
            &input,
            &output,
            ConversionOptions::default(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(artifact.path, output);
        assert_eq!(artifact.filename, "My Notes.pptx");
        assert!(artifact.slide_count >= 2);
        assert!(output.exists());
        assert!(!output.with_extension("pptx.tmp").exists());
    }

    #[tokio::test]
    async fn missing_input_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = convert_file(
            tmp.path().join("nope.txt"),
            tmp.path().join("nope.pptx"),
            ConversionOptions::default(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Doc2DeckError::InputReadFailed { .. }));
    }

    #[tokio::test]
    async fn convert_bytes_returns_zip() {
        let deck = convert_bytes(
            "a.txt",
            Some("text/plain"),
            b"Hello world".to_vec(),
            ConversionOptions::default(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(&deck[..2], b"PK");
    }

    #[tokio::test]
    async fn failed_job_surfaces_its_kind() {
        let err = convert_bytes(
            "a.pdf",
            None,
            b"%PDF-1.7\n".to_vec(),
            ConversionOptions::default(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.conversion_kind(), Some(ErrorKind::Extraction));
    }
}
