//! Conversion orchestrator: owns the job registry and drives each job
//! through its states.
//!
//! ## Lifecycle of one job
//!
//! ```text
//! intake ──▶ received ──run──▶ validating ──▶ extracting ──▶ segmenting ──▶ building ──▶ completed
//!   │                              │                                          ▲            │
//!   │ (size / type rejected,       └──────────── delegate ───────────────────┘            │
//!   │  nothing stored)                                                                    ▼
//!   ✗                          failed ◀── any stage error             retention expires → removed
//! ```
//!
//! - Stages run strictly one after another inside [`Orchestrator::run`].
//!   Independent jobs share nothing but the [`StorageArea`] namespace.
//! - Every stage failure becomes exactly one `failed` state with a
//!   [`ConversionError`]; nothing is retried.
//! - Entering a terminal state releases the input; `failed` also releases
//!   any partial output. A completed deck stays retrievable until the
//!   retention timeout, then the janitor removes it.
//! - [`Orchestrator::abandon`] marks a running job; the runner notices at the
//!   next stage boundary, cleans up and drops the job.
//!
//! All state changes happen under the registry lock through
//! [`ConversionJob::advance`], so pollers never see progress move backwards.

use crate::config::ServiceConfig;
use crate::error::{ConversionError, Doc2DeckError};
use crate::job::{ConversionJob, JobId, JobSnapshot, JobState};
use crate::options::{ConversionOptions, OptionsForm};
use crate::output::{DeckArtifact, UploadedDocument};
use crate::phrasing::phrasing;
use crate::pipeline::build::{build_deck_until, partial_path, DeckMeta};
use crate::pipeline::delegate::Delegate;
use crate::pipeline::detect::{charset, detect};
use crate::pipeline::extract::extract;
use crate::pipeline::segment::segment;
use crate::storage::{StorageArea, StorageKind};
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A document as received from a client, before anything is stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub form: OptionsForm,
}

impl Upload {
    pub fn new(filename: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
            form: OptionsForm::default(),
        }
    }

    pub fn with_form(mut self, form: OptionsForm) -> Self {
        self.form = form;
        self
    }

    pub fn with_options(self, options: ConversionOptions) -> Self {
        self.with_form(options.into())
    }
}

/// Why a run stopped before producing a deck.
enum Stop {
    Failed(ConversionError),
    Abandoned,
}

impl From<ConversionError> for Stop {
    fn from(e: ConversionError) -> Self {
        Stop::Failed(e)
    }
}

/// Drives conversion jobs. Cheap to clone; clones share one registry.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServiceConfig,
    storage: StorageArea,
    delegate: Option<Delegate>,
    jobs: RwLock<HashMap<JobId, ConversionJob>>,
    /// Woken whenever a job settles or disappears.
    settled: Notify,
    shutdown: watch::Sender<bool>,
}

impl Orchestrator {
    pub fn new(config: ServiceConfig) -> Self {
        let storage = StorageArea::new(config.storage_root.clone());
        let delegate = config.delegate.clone().map(Delegate::new);
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                storage,
                delegate,
                jobs: RwLock::new(HashMap::new()),
                settled: Notify::new(),
                shutdown,
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn storage(&self) -> &StorageArea {
        &self.inner.storage
    }

    /// Jobs currently registered, in any state.
    pub async fn job_count(&self) -> usize {
        self.inner.jobs.read().await.len()
    }

    // ── Intake ────────────────────────────────────────────────────────────

    /// Check, store and register an upload in `received`.
    ///
    /// Oversized uploads and unsupported formats are rejected before any
    /// storage is allocated.
    pub async fn intake(&self, upload: Upload) -> Result<JobId, Doc2DeckError> {
        let limit = self.inner.config.max_upload_bytes;
        if upload.filename.trim().is_empty() {
            return Err(Doc2DeckError::Rejected(ConversionError::validation(
                "No file uploaded",
            )));
        }
        if upload.bytes.len() as u64 > limit {
            return Err(Doc2DeckError::Rejected(ConversionError::validation(format!(
                "File too large: {} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                limit
            ))));
        }
        let format = detect(upload.mime_type.as_deref(), &upload.filename);
        if !format.is_supported() {
            let declared = upload
                .mime_type
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| upload.filename.clone());
            return Err(Doc2DeckError::Rejected(ConversionError::UnsupportedFormat {
                declared,
            }));
        }

        let document = self
            .inner
            .storage
            .store_upload(&upload.filename, upload.mime_type, &upload.bytes)
            .await
            .map_err(|e| {
                warn!("Failed to store upload: {}", e);
                Doc2DeckError::Rejected(e.into())
            })?;

        let job = ConversionJob::new(document, upload.form);
        let id = job.id;
        info!(job_id = %id, filename = %upload.filename, format = %format, "Job received");
        self.inner.jobs.write().await.insert(id, job);

        if let Some(cb) = &self.inner.config.progress_callback {
            cb.on_job_received(id, &upload.filename);
        }
        Ok(id)
    }

    /// [`intake`](Self::intake), then run the job in the background.
    pub async fn submit(&self, upload: Upload) -> Result<JobId, Doc2DeckError> {
        let id = self.intake(upload).await?;
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.run(id).await {
                debug!(job_id = %id, "Background run ended without a result: {}", e);
            }
        });
        Ok(id)
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Drive a `received` job to a terminal state and return its snapshot.
    ///
    /// A failed conversion is still `Ok`: the failure is recorded on the
    /// snapshot. `Err` means the job could not be run at all (unknown,
    /// already started, or abandoned while running).
    pub async fn run(&self, id: JobId) -> Result<JobSnapshot, Doc2DeckError> {
        let (document, form) = {
            let mut jobs = self.inner.jobs.write().await;
            let job = jobs.get_mut(&id).ok_or(Doc2DeckError::JobNotFound(id))?;
            job.advance(JobState::Validating)
                .map_err(|e| Doc2DeckError::Internal(format!("job {id} cannot start: {e}")))?;
            (job.document.clone(), job.form.clone())
        };
        self.announce(id, JobState::Validating, 10);

        let input = document.stored_path.clone();
        let mut output = None;
        let outcome = self.execute(id, &document, &form, &mut output).await;
        self.settle(id, outcome, &input, output).await
    }

    async fn execute(
        &self,
        id: JobId,
        document: &UploadedDocument,
        form: &OptionsForm,
        output_slot: &mut Option<PathBuf>,
    ) -> Result<DeckArtifact, Stop> {
        let options = ConversionOptions::from_form(form)?;
        let format = detect(
            document.declared_mime_type.as_deref(),
            &document.original_filename,
        );
        if !format.is_supported() {
            return Err(Stop::Failed(ConversionError::UnsupportedFormat {
                declared: document
                    .declared_mime_type
                    .clone()
                    .unwrap_or_else(|| document.original_filename.clone()),
            }));
        }
        self.update(id, |job| {
            job.options = Some(options);
            job.format = Some(format);
        })
        .await?;

        let filename = DeckArtifact::download_name(&document.original_filename);
        let output = self
            .inner
            .storage
            .allocate(StorageKind::Output, &filename)
            .await
            .map_err(ConversionError::from)?;
        *output_slot = Some(output.clone());

        if let Some(delegate) = &self.inner.delegate {
            self.enter(id, JobState::Building).await?;
            let slide_count = delegate
                .run(&self.inner.storage, &document.stored_path, &output)
                .await?;
            return Ok(DeckArtifact {
                path: output,
                filename,
                slide_count,
            });
        }

        self.enter(id, JobState::Extracting).await?;
        let text = extract(
            &document.stored_path,
            format,
            charset(document.declared_mime_type.as_deref()),
            self.inner.config.stage_timeout,
        )
        .await?;
        debug!(job_id = %id, chars = text.len(), "Extracted text");

        self.enter(id, JobState::Segmenting).await?;
        let table = self.inner.config.segmentation.clone();
        let chunks = self
            .blocking("segmentation", Vec::new(), move |_| {
                Ok(segment(&text, &options, &table))
            })
            .await?;
        debug!(job_id = %id, chunks = chunks.len(), "Segmented content");

        self.enter(id, JobState::Building).await?;
        let meta = DeckMeta::from_filename(
            &document.original_filename,
            phrasing(options.audience_level),
        );
        let deck_path = output.clone();
        let leftovers = vec![output.clone(), partial_path(&output)];
        let slide_count = self
            .blocking("deck generation", leftovers, move |cancel| {
                build_deck_until(&chunks, &meta, &deck_path, cancel)
            })
            .await?;

        Ok(DeckArtifact {
            path: output,
            filename,
            slide_count,
        })
    }

    /// Record the outcome, release files and notify waiters.
    async fn settle(
        &self,
        id: JobId,
        outcome: Result<DeckArtifact, Stop>,
        input: &Path,
        output: Option<PathBuf>,
    ) -> Result<JobSnapshot, Doc2DeckError> {
        let storage = &self.inner.storage;
        storage.discard(input).await;

        let result = match outcome {
            Ok(artifact) => {
                let mut jobs = self.inner.jobs.write().await;
                match jobs.get_mut(&id) {
                    Some(job) if !job.abandoned => {
                        job.input_released = true;
                        let slide_count = artifact.slide_count;
                        job.complete(artifact)
                            .map_err(|e| Doc2DeckError::Internal(e.to_string()))?;
                        let snapshot = job.snapshot();
                        drop(jobs);
                        info!(job_id = %id, slides = slide_count, "Job completed");
                        self.announce(id, JobState::Completed, 100);
                        if let Some(cb) = &self.inner.config.progress_callback {
                            cb.on_job_complete(id, slide_count);
                        }
                        Ok(snapshot)
                    }
                    _ => {
                        jobs.remove(&id);
                        drop(jobs);
                        storage.discard(&artifact.path).await;
                        info!(job_id = %id, "Abandoned job discarded after completion");
                        Err(Doc2DeckError::JobNotFound(id))
                    }
                }
            }
            Err(Stop::Failed(error)) => {
                if let Some(path) = &output {
                    storage.discard(path).await;
                    storage.discard(&partial_path(path)).await;
                }
                let mut jobs = self.inner.jobs.write().await;
                match jobs.get_mut(&id) {
                    Some(job) if !job.abandoned => {
                        job.input_released = true;
                        job.fail(error.clone())
                            .map_err(|e| Doc2DeckError::Internal(e.to_string()))?;
                        let snapshot = job.snapshot();
                        drop(jobs);
                        info!(
                            job_id = %id,
                            kind = %error.kind(),
                            progress = snapshot.progress,
                            "Job failed: {}", error
                        );
                        if let Some(cb) = &self.inner.config.progress_callback {
                            cb.on_job_failed(id, &error);
                        }
                        Ok(snapshot)
                    }
                    _ => {
                        jobs.remove(&id);
                        Err(Doc2DeckError::JobNotFound(id))
                    }
                }
            }
            Err(Stop::Abandoned) => {
                if let Some(path) = &output {
                    storage.discard(path).await;
                    storage.discard(&partial_path(path)).await;
                }
                self.inner.jobs.write().await.remove(&id);
                info!(job_id = %id, "Abandoned job cleaned up");
                Err(Doc2DeckError::JobNotFound(id))
            }
        };

        self.inner.settled.notify_waiters();
        result
    }

    /// Stage boundary: honour abandonment, then advance.
    async fn enter(&self, id: JobId, state: JobState) -> Result<(), Stop> {
        let progress = {
            let mut jobs = self.inner.jobs.write().await;
            let job = jobs.get_mut(&id).ok_or(Stop::Abandoned)?;
            if job.abandoned {
                return Err(Stop::Abandoned);
            }
            job.advance(state)
                .map_err(|e| Stop::Failed(ConversionError::build(e.to_string())))?;
            job.progress()
        };
        self.announce(id, state, progress);
        Ok(())
    }

    async fn update(&self, id: JobId, f: impl FnOnce(&mut ConversionJob)) -> Result<(), Stop> {
        let mut jobs = self.inner.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(Stop::Abandoned)?;
        if job.abandoned {
            return Err(Stop::Abandoned);
        }
        f(job);
        Ok(())
    }

    fn announce(&self, id: JobId, state: JobState, progress: u8) {
        info!(job_id = %id, state = %state, progress, "Job advanced");
        if let Some(cb) = &self.inner.config.progress_callback {
            cb.on_state_change(id, state, progress);
        }
    }

    /// Run CPU-bound work on the blocking pool under the stage timeout.
    ///
    /// A blocking task cannot be aborted, so on timeout the cancel flag
    /// handed to `f` is raised and a follow-up task waits for `f` to return
    /// before releasing `leftovers`, the files `f` may still be writing.
    async fn blocking<T, F>(
        &self,
        stage: &str,
        leftovers: Vec<PathBuf>,
        f: F,
    ) -> Result<T, ConversionError>
    where
        T: Send + 'static,
        F: FnOnce(&AtomicBool) -> Result<T, ConversionError> + Send + 'static,
    {
        let limit = self.inner.config.stage_timeout;
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let mut task = tokio::task::spawn_blocking(move || f(&flag));

        let finished = tokio::time::timeout(limit, &mut task).await;
        match finished {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ConversionError::build(format!("{stage} aborted ({e})"))),
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                let this = self.clone();
                let stage_name = stage.to_string();
                tokio::spawn(async move {
                    let _ = task.await;
                    for path in &leftovers {
                        this.inner.storage.discard(path).await;
                    }
                    debug!("Timed-out {} finished; leftovers released", stage_name);
                });
                Err(ConversionError::build(format!(
                    "{stage} timed out after {}s",
                    limit.as_secs_f32()
                )))
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub async fn status(&self, id: JobId) -> Result<JobSnapshot, Doc2DeckError> {
        self.inner
            .jobs
            .read()
            .await
            .get(&id)
            .map(ConversionJob::snapshot)
            .ok_or(Doc2DeckError::JobNotFound(id))
    }

    /// The deck of a completed job.
    pub async fn retrieve(&self, id: JobId) -> Result<DeckArtifact, Doc2DeckError> {
        let jobs = self.inner.jobs.read().await;
        let job = jobs.get(&id).ok_or(Doc2DeckError::JobNotFound(id))?;
        match (job.state(), job.output(), job.error()) {
            (JobState::Completed, Some(artifact), _) => Ok(artifact.clone()),
            (JobState::Failed, _, Some(error)) => Err(Doc2DeckError::JobFailed(error.clone())),
            (state, _, _) if state.is_terminal() => Err(Doc2DeckError::Internal(format!(
                "job {id} is {state} without a result"
            ))),
            (state, _, _) => Err(Doc2DeckError::NotReady { id, state }),
        }
    }

    /// Block until the job is terminal.
    pub async fn wait(&self, id: JobId) -> Result<JobSnapshot, Doc2DeckError> {
        loop {
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let snapshot = self.status(id).await?;
            if snapshot.state.is_terminal() {
                return Ok(snapshot);
            }
            notified.await;
        }
    }

    // ── Cleanup ───────────────────────────────────────────────────────────

    /// Give up on a job.
    ///
    /// Terminal and not-yet-started jobs are removed at once together with
    /// their files. A running job is flagged; its runner removes it at the
    /// next stage boundary.
    pub async fn abandon(&self, id: JobId) -> Result<(), Doc2DeckError> {
        let removed = {
            let mut jobs = self.inner.jobs.write().await;
            let job = jobs.get_mut(&id).ok_or(Doc2DeckError::JobNotFound(id))?;
            match job.state() {
                JobState::Received | JobState::Completed | JobState::Failed => jobs.remove(&id),
                _ => {
                    job.abandoned = true;
                    None
                }
            }
        };

        match removed {
            Some(job) => {
                self.release_files(&job).await;
                info!(job_id = %id, "Job abandoned and removed");
                self.inner.settled.notify_waiters();
            }
            None => info!(job_id = %id, "Job abandoned; cleanup at next stage boundary"),
        }
        Ok(())
    }

    /// Remove jobs older than the retention timeout: terminal jobs counted
    /// from when they finished, never-started jobs from when they arrived.
    ///
    /// Returns the number of jobs removed.
    pub async fn sweep_expired(&self) -> usize {
        let retention = chrono::Duration::from_std(self.inner.config.retention)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        let now = Utc::now();

        let expired: Vec<ConversionJob> = {
            let mut jobs = self.inner.jobs.write().await;
            let ids: Vec<JobId> = jobs
                .values()
                .filter(|j| {
                    let since = match j.state() {
                        JobState::Received => Some(j.created_at),
                        state if state.is_terminal() => j.finished_at,
                        _ => None,
                    };
                    since
                        .and_then(|t| t.checked_add_signed(retention))
                        .is_some_and(|deadline| deadline <= now)
                })
                .map(|j| j.id)
                .collect();
            ids.iter().filter_map(|id| jobs.remove(id)).collect()
        };

        for job in &expired {
            self.release_files(job).await;
        }
        if !expired.is_empty() {
            info!("Swept {} expired job(s)", expired.len());
            self.inner.settled.notify_waiters();
        }
        expired.len()
    }

    /// Call [`sweep_expired`](Self::sweep_expired) every `sweep_interval`
    /// until [`shutdown`](Self::shutdown).
    pub fn spawn_janitor(&self) -> JoinHandle<()> {
        let this = self.clone();
        let mut stop = self.inner.shutdown.subscribe();
        let period = self.inner.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        this.sweep_expired().await;
                    }
                    _ = stop.changed() => break,
                }
            }
            debug!("Janitor stopped");
        })
    }

    /// Stop the janitor, drop every job and purge the storage area.
    ///
    /// Running jobs are flagged as abandoned and clean up after themselves.
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);

        let removed: Vec<ConversionJob> = {
            let mut jobs = self.inner.jobs.write().await;
            for job in jobs.values_mut() {
                job.abandoned = true;
            }
            let ids: Vec<JobId> = jobs
                .values()
                .filter(|j| j.state() == JobState::Received || j.state().is_terminal())
                .map(|j| j.id)
                .collect();
            ids.iter().filter_map(|id| jobs.remove(id)).collect()
        };
        for job in &removed {
            self.release_files(job).await;
        }
        self.inner.settled.notify_waiters();

        if let Err(e) = self.inner.storage.purge().await {
            warn!("Could not purge storage area: {}", e);
        }
        info!("Orchestrator shut down; {} job(s) dropped", removed.len());
    }

    async fn release_files(&self, job: &ConversionJob) {
        let storage = &self.inner.storage;
        storage.discard(&job.document.stored_path).await;
        if let Some(artifact) = job.output() {
            storage.discard(&artifact.path).await;
        }
    }
}
