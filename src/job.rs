//! Conversion job model and its state machine.
//!
//! ```text
//! received ─▶ validating ─▶ extracting ─▶ segmenting ─▶ building ─▶ completed
//!                  │                                       ▲
//!                  └──────────── (delegate path) ──────────┘
//!
//! failed ◀── any non-terminal state
//! ```
//!
//! [`ConversionJob::advance`] is the only way to change a job's state. It
//! refuses out-of-order moves and keeps `progress` monotonic, so the state a
//! poller observes always agrees with the progress it observes.

use crate::error::ConversionError;
use crate::options::{ConversionOptions, OptionsForm};
use crate::output::{DeckArtifact, UploadedDocument};
use crate::pipeline::detect::DocumentFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Received,
    Validating,
    Extracting,
    Segmenting,
    Building,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Received => "received",
            JobState::Validating => "validating",
            JobState::Extracting => "extracting",
            JobState::Segmenting => "segmenting",
            JobState::Building => "building",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Progress percentage shown to pollers while in this state.
    ///
    /// `Failed` has no percentage of its own; a failed job keeps the value of
    /// the state it failed in.
    pub fn progress(&self) -> Option<u8> {
        match self {
            JobState::Received => Some(0),
            JobState::Validating => Some(10),
            JobState::Extracting => Some(30),
            JobState::Segmenting => Some(50),
            JobState::Building => Some(80),
            JobState::Completed => Some(100),
            JobState::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Completed | Failed, _) => false,
            (_, Failed) => true,
            (Received, Validating)
            | (Validating, Extracting)
            | (Extracting, Segmenting)
            | (Segmenting, Building)
            | (Building, Completed) => true,
            // Delegate path: the external converter replaces extract + segment.
            (Validating, Building) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected transition; indicates a programming error in the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal job transition {from} → {to}")]
pub struct InvalidTransition {
    pub from: JobState,
    pub to: JobState,
}

/// One end-to-end request to convert a single document into a deck.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub id: JobId,
    pub document: UploadedDocument,
    pub form: OptionsForm,
    /// Set once validation succeeds.
    pub options: Option<ConversionOptions>,
    /// Set once format detection succeeds.
    pub format: Option<DocumentFormat>,
    state: JobState,
    progress: u8,
    output: Option<DeckArtifact>,
    error: Option<ConversionError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// The caller gave up on this job; clean up at the next opportunity.
    pub abandoned: bool,
    /// The input file has already been released.
    pub input_released: bool,
}

impl ConversionJob {
    pub fn new(document: UploadedDocument, form: OptionsForm) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            document,
            form,
            options: None,
            format: None,
            state: JobState::Received,
            progress: 0,
            output: None,
            error: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
            abandoned: false,
            input_released: false,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn output(&self) -> Option<&DeckArtifact> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&ConversionError> {
        self.error.as_ref()
    }

    /// Move to a non-terminal successor state.
    pub fn advance(&mut self, next: JobState) -> Result<(), InvalidTransition> {
        if next.is_terminal() || !self.state.can_advance_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.enter(next);
        Ok(())
    }

    /// Record the deck and move `building → completed`.
    pub fn complete(&mut self, artifact: DeckArtifact) -> Result<(), InvalidTransition> {
        if !self.state.can_advance_to(JobState::Completed) {
            return Err(InvalidTransition {
                from: self.state,
                to: JobState::Completed,
            });
        }
        self.output = Some(artifact);
        self.enter(JobState::Completed);
        Ok(())
    }

    /// Record the failure and move to `failed`.
    pub fn fail(&mut self, error: ConversionError) -> Result<(), InvalidTransition> {
        if !self.state.can_advance_to(JobState::Failed) {
            return Err(InvalidTransition {
                from: self.state,
                to: JobState::Failed,
            });
        }
        self.error = Some(error);
        self.enter(JobState::Failed);
        Ok(())
    }

    fn enter(&mut self, next: JobState) {
        self.state = next;
        if let Some(p) = next.progress() {
            self.progress = self.progress.max(p);
        }
        self.updated_at = Utc::now();
        if next.is_terminal() {
            self.finished_at = Some(self.updated_at);
        }
    }

    /// Point-in-time view handed to callers.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            filename: self.document.original_filename.clone(),
            state: self.state,
            progress: self.progress,
            slide_count: self.output.as_ref().map(|a| a.slide_count),
            output_filename: self.output.as_ref().map(|a| a.filename.clone()),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of a job's observable state. Contains no filesystem paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub filename: String,
    pub state: JobState,
    pub progress: u8,
    pub slide_count: Option<usize>,
    pub output_filename: Option<String>,
    pub error: Option<ConversionError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
