//! Service configuration.
//!
//! All orchestration behaviour is controlled through [`ServiceConfig`], built
//! via its [`ServiceConfigBuilder`]. One struct holds every knob (storage
//! location, limits, timeouts, the segmentation table and the optional
//! external converter), so the HTTP server, the CLI and the library entry
//! points all share one validated source of truth.

use crate::error::Doc2DeckError;
use crate::options::TargetLength;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for the conversion service.
///
/// Built via [`ServiceConfig::builder()`] or using [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2deck::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::builder()
///     .storage_root("/var/tmp/doc2deck")
///     .retention(Duration::from_secs(600))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Directory under which uploads and generated decks live.
    /// Default: `$TMPDIR/doc2deck`.
    pub storage_root: PathBuf,

    /// Largest accepted upload in bytes. Default: 10 MiB.
    pub max_upload_bytes: u64,

    /// How long a finished job (and its deck) stays retrievable. Default: 15 min.
    pub retention: Duration,

    /// How often the janitor looks for expired jobs. Default: 60 s.
    pub sweep_interval: Duration,

    /// Wall-clock limit for each in-process stage. Default: 60 s.
    ///
    /// A timeout during extraction is reported as an extraction failure; during
    /// segmentation or building as a build failure.
    pub stage_timeout: Duration,

    /// Chunk-count and chunk-size table used by the segmenter.
    pub segmentation: SegmentationTable,

    /// Hand whole jobs to an external converter instead of the in-process
    /// pipeline. Default: `None`.
    pub delegate: Option<DelegateConfig>,

    /// Receives job lifecycle events. Default: `None`.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_root: std::env::temp_dir().join("doc2deck"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            retention: Duration::from_secs(15 * 60),
            sweep_interval: Duration::from_secs(60),
            stage_timeout: Duration::from_secs(60),
            segmentation: SegmentationTable::default(),
            delegate: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("storage_root", &self.storage_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("retention", &self.retention)
            .field("sweep_interval", &self.sweep_interval)
            .field("stage_timeout", &self.stage_timeout)
            .field("segmentation", &self.segmentation)
            .field("delegate", &self.delegate)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.storage_root = root.into();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn retention(mut self, retention: Duration) -> Self {
        self.config.retention = retention;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval.max(Duration::from_millis(10));
        self
    }

    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        self.config.stage_timeout = timeout;
        self
    }

    pub fn segmentation(mut self, table: SegmentationTable) -> Self {
        self.config.segmentation = table;
        self
    }

    pub fn delegate(mut self, delegate: DelegateConfig) -> Self {
        self.config.delegate = Some(delegate);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, Doc2DeckError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(Doc2DeckError::InvalidConfig(
                "max_upload_bytes must be > 0".into(),
            ));
        }
        if c.stage_timeout.is_zero() {
            return Err(Doc2DeckError::InvalidConfig(
                "stage_timeout must be > 0".into(),
            ));
        }
        c.segmentation.validate()?;
        if let Some(d) = &c.delegate {
            if d.program.as_os_str().is_empty() {
                return Err(Doc2DeckError::InvalidConfig(
                    "delegate program must not be empty".into(),
                ));
            }
            if d.max_concurrent == 0 {
                return Err(Doc2DeckError::InvalidConfig(
                    "delegate max_concurrent must be ≥ 1".into(),
                ));
            }
            if d.timeout.is_zero() {
                return Err(Doc2DeckError::InvalidConfig(
                    "delegate timeout must be > 0".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Segmentation table ───────────────────────────────────────────────────

/// Sizing for one [`TargetLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthProfile {
    /// Most body chunks (slides) the deck may carry; the rest is overflow.
    pub max_chunks: usize,
    /// Soft character budget of one body chunk.
    pub chunk_chars: usize,
}

/// Chunk-count thresholds per target length.
///
/// Short decks get fewer, larger chunks; long decks get more, smaller ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationTable {
    pub short: LengthProfile,
    pub medium: LengthProfile,
    pub long: LengthProfile,
    /// Characters of leading text used for the synthesized summary chunk.
    pub summary_chars: usize,
}

impl Default for SegmentationTable {
    fn default() -> Self {
        Self {
            short: LengthProfile {
                max_chunks: 5,
                chunk_chars: 1200,
            },
            medium: LengthProfile {
                max_chunks: 10,
                chunk_chars: 800,
            },
            long: LengthProfile {
                max_chunks: 20,
                chunk_chars: 500,
            },
            summary_chars: 280,
        }
    }
}

impl SegmentationTable {
    pub fn profile(&self, length: TargetLength) -> LengthProfile {
        match length {
            TargetLength::Short => self.short,
            TargetLength::Medium => self.medium,
            TargetLength::Long => self.long,
        }
    }

    fn validate(&self) -> Result<(), Doc2DeckError> {
        for (name, p) in [("short", self.short), ("medium", self.medium), ("long", self.long)] {
            if p.max_chunks == 0 {
                return Err(Doc2DeckError::InvalidConfig(format!(
                    "segmentation.{name}.max_chunks must be ≥ 1"
                )));
            }
            if p.chunk_chars < 16 {
                return Err(Doc2DeckError::InvalidConfig(format!(
                    "segmentation.{name}.chunk_chars must be ≥ 16, got {}",
                    p.chunk_chars
                )));
            }
        }
        if self.summary_chars == 0 {
            return Err(Doc2DeckError::InvalidConfig(
                "segmentation.summary_chars must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// ── External converter ───────────────────────────────────────────────────

/// An external executable that converts a whole document into a deck.
///
/// Invoked as `program [args…] <input-path> <output-path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateConfig {
    pub program: PathBuf,
    /// Arguments placed before the two paths.
    pub args: Vec<String>,
    /// Wall-clock limit for one run. Default: 120 s.
    pub timeout: Duration,
    /// Subprocesses allowed to run at once. Default: 4.
    pub max_concurrent: usize,
}

impl DelegateConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(120),
            max_concurrent: 4,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = ServiceConfig::builder().build().unwrap();
        assert_eq!(c.max_upload_bytes, 10 * 1024 * 1024);
        assert!(c.delegate.is_none());
    }

    #[test]
    fn short_has_fewer_larger_chunks_than_long() {
        let t = SegmentationTable::default();
        let short = t.profile(TargetLength::Short);
        let long = t.profile(TargetLength::Long);
        assert!(short.max_chunks < long.max_chunks);
        assert!(short.chunk_chars > long.chunk_chars);
    }

    #[test]
    fn zero_delegate_concurrency_is_rejected() {
        let err = ServiceConfig::builder()
            .delegate(DelegateConfig::new("/usr/bin/convert").max_concurrent(0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_concurrent"));
    }

    #[test]
    fn tiny_chunks_are_rejected() {
        let mut table = SegmentationTable::default();
        table.medium.chunk_chars = 4;
        assert!(ServiceConfig::builder().segmentation(table).build().is_err());
    }
}
