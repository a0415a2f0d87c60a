//! Error types for the doc2deck library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`ConversionError`]: **Job-level**: one conversion job failed at one
//!   stage (bad options, unparsable document, deck write failure). It is
//!   recorded on the job, survives the job's lifetime, and is what a caller
//!   polling the job eventually sees. It is `Clone + Serialize` so it can be
//!   handed out in snapshots and HTTP responses.
//!
//! * [`Doc2DeckError`]: **API-level**: the call itself could not be served
//!   (unknown job id, result not ready yet, invalid service configuration,
//!   upload rejected at intake). Returned as `Err(Doc2DeckError)` from the
//!   orchestrator and the top-level `convert*` functions.
//!
//! Neither type ever renders a filesystem path in its `Display` output:
//! messages travel to HTTP clients verbatim. Paths go to `tracing` instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobId, JobState};

/// Stable error taxonomy exposed to callers.
///
/// The kind decides who is at fault and therefore which HTTP status class a
/// failure maps to: client-caused kinds are 400-class, server-side kinds are
/// 500-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad or missing options, unsupported file type, oversized upload.
    #[serde(rename = "ValidationError")]
    Validation,
    /// The file cannot be decoded as its declared format.
    #[serde(rename = "ExtractionError")]
    Extraction,
    /// Deck generation or external converter failure.
    #[serde(rename = "BuildError")]
    Build,
    /// Filesystem allocation or cleanup failure.
    #[serde(rename = "StorageError")]
    Storage,
}

impl ErrorKind {
    /// Wire name of the kind, e.g. `"ExtractionError"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::Build => "BuildError",
            ErrorKind::Storage => "StorageError",
        }
    }

    /// `true` when the client can fix the failure by sending different input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::Validation | ErrorKind::Extraction)
    }

    /// HTTP status code for this kind (400 or 500).
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure recorded on a single conversion job.
///
/// Every stage failure is converted into exactly one of these at the
/// orchestrator boundary and the job moves to `failed`. Stages are never
/// retried: a retry must start a fresh job with fresh storage.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConversionError {
    // ── Client-caused ─────────────────────────────────────────────────────
    /// Options are missing or unrecognised, or the upload was rejected.
    #[error("{detail}")]
    Validation { detail: String },

    /// The document type is not one of plain text, PDF or Word.
    #[error("Unsupported document type '{declared}'. Accepted: .txt, .pdf, .docx")]
    UnsupportedFormat { declared: String },

    /// The document could not be decoded as its declared format.
    #[error("Could not extract text from {format} document: {detail}")]
    Extraction { format: String, detail: String },

    // ── Server-side ───────────────────────────────────────────────────────
    /// Deck generation, or the external converter, failed.
    #[error("Slide deck generation failed: {detail}")]
    Build { detail: String },

    /// Storage allocation or write failed.
    #[error("Storage failure: {detail}")]
    Storage { detail: String },
}

impl ConversionError {
    pub fn validation(detail: impl Into<String>) -> Self {
        ConversionError::Validation {
            detail: detail.into(),
        }
    }

    pub fn extraction(format: impl fmt::Display, detail: impl Into<String>) -> Self {
        ConversionError::Extraction {
            format: format.to_string(),
            detail: detail.into(),
        }
    }

    pub fn build(detail: impl Into<String>) -> Self {
        ConversionError::Build {
            detail: detail.into(),
        }
    }

    /// The stable taxonomy kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Validation { .. } | ConversionError::UnsupportedFormat { .. } => {
                ErrorKind::Validation
            }
            ConversionError::Extraction { .. } => ErrorKind::Extraction,
            ConversionError::Build { .. } => ErrorKind::Build,
            ConversionError::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// All API-level errors returned by the doc2deck library.
///
/// Job-level stage failures use [`ConversionError`] and are stored on the
/// job rather than propagated here, except when a caller asks for the result
/// of a failed job ([`Doc2DeckError::JobFailed`]) or intake rejects an
/// upload outright ([`Doc2DeckError::Rejected`]).
#[derive(Debug, Error)]
pub enum Doc2DeckError {
    // ── Intake ────────────────────────────────────────────────────────────
    /// The upload was refused before any storage was allocated, or storing
    /// it failed.
    #[error(transparent)]
    Rejected(ConversionError),

    // ── Job lookup ────────────────────────────────────────────────────────
    /// No job with this id exists (never created, abandoned, or expired).
    #[error("Job {0} not found or expired")]
    JobNotFound(JobId),

    /// The job has not reached a terminal state yet.
    #[error("Job {id} is still {state} and has no result yet")]
    NotReady { id: JobId, state: JobState },

    /// The job reached `failed`; the recorded failure is attached.
    #[error(transparent)]
    JobFailed(ConversionError),

    // ── Local files ───────────────────────────────────────────────────────
    /// Could not read the caller-chosen input file.
    #[error("Failed to read input file '{}': {source}", path.display())]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the deck to the caller-chosen destination.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2DeckError {
    /// The taxonomy kind when this error wraps a job-level failure.
    pub fn conversion_kind(&self) -> Option<ErrorKind> {
        match self {
            Doc2DeckError::Rejected(e) | Doc2DeckError::JobFailed(e) => Some(e.kind()),
            _ => None,
        }
    }
}
