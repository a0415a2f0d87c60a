//! # doc2deck
//!
//! Convert uploaded documents (plain text, PDF, Word) into PowerPoint
//! `.pptx` decks, as an HTTP service, a CLI or a library call.
//!
//! ## Why this crate?
//!
//! Turning a long document into slides is mostly bookkeeping: decode the
//! file, cut its text into slide-sized pieces, lay those out, and clean up
//! every temporary file no matter which step fails. This crate does that
//! bookkeeping with one explicit state machine per job, a closed set of
//! format strategies and a storage area whose files never outlive their job.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 0. Intake    size / type check, store under the storage root
//!  ├─ 1. Validate  parse options, detect format            (10 %)
//!  ├─ 2. Extract   txt / pdf / docx → normalised text      (30 %)
//!  ├─ 3. Segment   text → ordered slide chunks             (50 %)
//!  ├─ 4. Build     chunks → .pptx (atomic write)           (80 %)
//!  └─ 5. Done      deck retrievable until retention ends   (100 %)
//!
//!  2–4 may be replaced by an external converter process.
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2deck::{convert_file, ConversionOptions, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default();
//!     let deck = convert_file(
//!         "report.docx",
//!         "report.pptx",
//!         ConversionOptions::default(),
//!         &config,
//!     )
//!     .await?;
//!     eprintln!("{} slides", deck.slide_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Running the service
//!
//! ```rust,no_run
//! use doc2deck::{server, Orchestrator, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let orchestrator = Orchestrator::new(ServiceConfig::default());
//!     let janitor = orchestrator.spawn_janitor();
//!     let addr = "127.0.0.1:8080".parse().expect("valid address");
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     server::serve(addr, orchestrator.clone(), shutdown).await?;
//!     orchestrator.shutdown().await;
//!     let _ = janitor.await;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2deck` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2deck = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod phrasing;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DelegateConfig, LengthProfile, SegmentationTable, ServiceConfig, ServiceConfigBuilder,
};
pub use convert::{convert_bytes, convert_file};
pub use error::{ConversionError, Doc2DeckError, ErrorKind};
pub use job::{ConversionJob, JobId, JobSnapshot, JobState};
pub use options::{AudienceLevel, ConversionOptions, OptionsForm, TargetLength};
pub use orchestrator::{Orchestrator, Upload};
pub use output::{DeckArtifact, UploadedDocument};
pub use pipeline::detect::DocumentFormat;
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use storage::{StorageArea, StorageKind};
