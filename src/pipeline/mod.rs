//! Pipeline stages for document-to-deck conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets the
//! orchestrator swap the whole local chain for an external converter
//! without touching any stage.
//!
//! ## Data Flow
//!
//! ```text
//! detect ──▶ extract ──▶ normalize ──▶ segment ──▶ build
//! (mime/ext)  (strategy)   (cleanup)     (chunks)    (.pptx)
//!
//! detect ──▶ delegate                                  (external program)
//! ```
//!
//! 1. [`detect`]: classify the upload from its mimetype and extension
//! 2. [`extract`]: one [`extract::TextStrategy`] per format; runs in
//!    `spawn_blocking` because the parsers are synchronous and may panic
//! 3. [`normalize`]: deterministic text cleanup shared by all formats
//! 4. [`segment`]: size and tag content for one slide per chunk
//! 5. [`build`]: write the OOXML package
//! 6. [`delegate`]: replaces 2–5 with an external converter

pub mod build;
pub mod delegate;
pub mod detect;
pub mod extract;
pub mod normalize;
pub mod segment;
