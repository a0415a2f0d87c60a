//! Progress-callback trait for job lifecycle events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ServiceConfigBuilder::progress_callback`] to receive
//! events as the orchestrator moves each job through its states.
//!
//! Polling [`crate::Orchestrator::status`] is enough for HTTP clients; the
//! callback is for hosts that want a push feed instead: the CLI drives its
//! progress bar from it, a server could forward it to a websocket.
//!
//! # Example
//!
//! ```rust
//! use doc2deck::{JobId, JobProgressCallback, JobState, ServiceConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     transitions: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for CountingCallback {
//!     fn on_state_change(&self, _job: JobId, _state: JobState, _progress: u8) {
//!         self.transitions.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { transitions: AtomicUsize::new(0) });
//! let config = ServiceConfig::builder()
//!     .progress_callback(counter as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ConversionError;
use crate::job::{JobId, JobState};
use std::sync::Arc;

/// Called by the orchestrator as jobs progress.
///
/// Jobs run concurrently, so implementations must be `Send + Sync` and
/// protect shared mutable state. All methods default to no-ops.
///
/// Events for one job arrive in state order; events for different jobs
/// interleave freely.
pub trait JobProgressCallback: Send + Sync {
    /// A job was registered in `received` after a successful intake.
    fn on_job_received(&self, job: JobId, filename: &str) {
        let _ = (job, filename);
    }

    /// A job entered a new non-terminal state, or `completed`.
    ///
    /// # Arguments
    /// * `progress`: the percentage mapped to `state` (0–100)
    fn on_state_change(&self, job: JobId, state: JobState, progress: u8) {
        let _ = (job, state, progress);
    }

    /// A job reached `completed`.
    fn on_job_complete(&self, job: JobId, slide_count: usize) {
        let _ = (job, slide_count);
    }

    /// A job reached `failed`.
    fn on_job_failed(&self, job: JobId, error: &ConversionError) {
        let _ = (job, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ServiceConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<(JobState, u8)>>,
        failures: Mutex<Vec<String>>,
    }

    impl JobProgressCallback for Recorder {
        fn on_state_change(&self, _job: JobId, state: JobState, progress: u8) {
            self.states.lock().unwrap().push((state, progress));
        }

        fn on_job_failed(&self, _job: JobId, error: &ConversionError) {
            self.failures.lock().unwrap().push(error.kind().to_string());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let id = JobId::new();
        cb.on_job_received(id, "notes.txt");
        cb.on_state_change(id, JobState::Extracting, 30);
        cb.on_job_complete(id, 4);
        cb.on_job_failed(id, &ConversionError::build("boom"));
    }

    #[test]
    fn recorder_sees_events_through_arc_dyn() {
        let rec = Arc::new(Recorder::default());
        let cb: ProgressCallback = rec.clone();
        let id = JobId::new();
        cb.on_state_change(id, JobState::Validating, 10);
        cb.on_state_change(id, JobState::Extracting, 30);
        cb.on_job_failed(id, &ConversionError::extraction("PDF", "truncated"));

        assert_eq!(
            *rec.states.lock().unwrap(),
            vec![(JobState::Validating, 10), (JobState::Extracting, 30)]
        );
        assert_eq!(*rec.failures.lock().unwrap(), vec!["ExtractionError"]);
    }
}
