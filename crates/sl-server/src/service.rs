//! Conversion lifecycle manager.
//!
//! [`ConversionService`] is the single authority for what happens to a job
//! from acceptance to terminal state. The synchronous path runs the engine
//! inline and retains nothing; the asynchronous path creates a registry
//! record and hands the work to the worker pool. The worker task is the sole
//! writer of its job's record.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sl_core::events::{EventBus, EventPayload};
use sl_core::{Error, Job, JobId, JobStatus, Result};
use sl_omr::OmrEngine;

use crate::pool::WorkerPool;
use crate::store::JobStore;

/// Orchestrates job creation, engine dispatch, and status recording.
pub struct ConversionService {
    store: Arc<JobStore>,
    pool: WorkerPool,
    engine: Arc<dyn OmrEngine>,
    event_bus: Arc<EventBus>,
    temp_dir: PathBuf,
    deadline: Duration,
}

impl ConversionService {
    /// Create a service with its own worker pool of `workers` slots.
    ///
    /// `temp_dir` must already exist; `deadline` bounds every engine
    /// invocation on both request paths.
    pub fn new(
        store: Arc<JobStore>,
        engine: Arc<dyn OmrEngine>,
        event_bus: Arc<EventBus>,
        temp_dir: PathBuf,
        workers: usize,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            pool: WorkerPool::new(workers),
            engine,
            event_bus,
            temp_dir,
            deadline,
        }
    }

    /// Convert a document synchronously.
    ///
    /// The job identifier exists only for file naming and request
    /// correlation; no record is stored and all failures propagate directly.
    pub async fn convert_sync(&self, filename: &str, content: &[u8]) -> Result<(JobId, Vec<u8>)> {
        validate_upload(filename, content)?;

        let id = JobId::new();
        let input = self.persist_input(id, filename, content).await?;
        tracing::info!(job_id = %id, file = filename, "Converting synchronously");

        let artifact = self.run_engine(&input, &self.output_path(id)).await?;
        Ok((id, artifact))
    }

    /// Accept a document for background conversion.
    ///
    /// Returns the pending job snapshot immediately; the conversion itself
    /// runs on a worker slot. The submitted task owns its own handles to the
    /// store, engine, and event bus, and is the sole writer of this job's
    /// record.
    pub async fn convert_async(&self, filename: &str, content: &[u8]) -> Result<Job> {
        validate_upload(filename, content)?;

        let id = JobId::new();
        let input = self.persist_input(id, filename, content).await?;
        let job = self.store.create(id, input)?;
        tracing::info!(job_id = %id, file = filename, "Queued conversion job");
        self.event_bus.broadcast(EventPayload::JobQueued { job_id: id });

        let worker = JobWorker {
            store: self.store.clone(),
            engine: self.engine.clone(),
            event_bus: self.event_bus.clone(),
            output: self.output_path(id),
            deadline: self.deadline,
        };
        self.pool.submit(async move {
            worker.execute(id).await;
        });

        Ok(job)
    }

    /// Current snapshot of a job record. Pure registry read.
    pub fn status(&self, id: JobId) -> Result<Job> {
        self.store
            .get(id)
            .ok_or_else(|| Error::not_found("job", id))
    }

    /// Load the artifact of a completed job.
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] unless the job is completed;
    /// [`Error::ArtifactMissing`] when the backing file has disappeared.
    /// Never mutates the stored record.
    pub async fn artifact(&self, id: JobId) -> Result<Vec<u8>> {
        let job = self.status(id)?;
        if job.status != JobStatus::Completed {
            return Err(Error::not_ready(id));
        }
        let output = job
            .output_path
            .ok_or_else(|| Error::Internal(format!("completed job {id} has no output path")))?;

        match tokio::fs::read(&output).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::artifact_missing(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot of all job records, oldest first.
    pub fn list(&self) -> Vec<Job> {
        self.store.list()
    }

    /// Short name of the active recognition engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Worker pool introspection: (slots, active, outstanding).
    pub fn pool_stats(&self) -> (usize, usize, usize) {
        (self.pool.slots(), self.pool.active(), self.pool.outstanding())
    }

    /// Gracefully drain the worker pool.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    /// Invoke the engine under the configured deadline.
    async fn run_engine(&self, input: &Path, output: &Path) -> Result<Vec<u8>> {
        run_engine(self.engine.as_ref(), self.deadline, input, output).await
    }

    /// Persist an uploaded document under the job's identifier, preserving
    /// the original file extension.
    async fn persist_input(&self, id: JobId, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let path = match file_extension(filename) {
            Some(ext) => self.temp_dir.join(format!("{id}_input.{ext}")),
            None => self.temp_dir.join(format!("{id}_input")),
        };
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Where the artifact for `id` is written.
    fn output_path(&self, id: JobId) -> PathBuf {
        self.temp_dir.join(format!("{id}_output.musicxml"))
    }
}

/// Everything a background task needs to run one job to a terminal state.
struct JobWorker {
    store: Arc<JobStore>,
    engine: Arc<dyn OmrEngine>,
    event_bus: Arc<EventBus>,
    output: PathBuf,
    deadline: Duration,
}

impl JobWorker {
    /// Execution body for one job. Sole writer of its record; never lets a
    /// failure escape the worker task.
    async fn execute(self, id: JobId) {
        let input = match self.store.update(id, |job| job.start()) {
            Ok(job) => {
                self.event_bus.broadcast(EventPayload::JobStarted { job_id: id });
                tracing::info!(job_id = %id, "Processing conversion job");
                job.input_path
            }
            Err(e) => {
                // The record was evicted or is in an impossible state.
                tracing::error!(job_id = %id, error = %e, "Cannot start job");
                return;
            }
        };

        match run_engine(self.engine.as_ref(), self.deadline, &input, &self.output).await {
            Ok(_) => {
                let output = self.output.clone();
                if let Err(e) = self.store.update(id, |job| job.complete(output)) {
                    tracing::error!(job_id = %id, error = %e, "Cannot record completion");
                    return;
                }
                self.event_bus.broadcast(EventPayload::JobCompleted { job_id: id });
                tracing::info!(job_id = %id, "Conversion completed");
            }
            Err(e) => {
                let error_msg = e.to_string();
                tracing::error!(job_id = %id, error = %error_msg, "Conversion failed");
                if let Err(e) = self.store.update(id, |job| job.fail(error_msg.clone())) {
                    tracing::error!(job_id = %id, error = %e, "Cannot record failure");
                    return;
                }
                self.event_bus.broadcast(EventPayload::JobFailed {
                    job_id: id,
                    error: error_msg,
                });
            }
        }
    }
}

/// Invoke an engine with a hard deadline.
async fn run_engine(
    engine: &dyn OmrEngine,
    deadline: Duration,
    input: &Path,
    output: &Path,
) -> Result<Vec<u8>> {
    match tokio::time::timeout(deadline, engine.convert(input, output)).await {
        Ok(result) => result,
        Err(_) => Err(Error::engine(format!(
            "conversion exceeded the {}s deadline",
            deadline.as_secs()
        ))),
    }
}

/// Last `.`-delimited suffix of a filename, if any.
fn file_extension(filename: &str) -> Option<&str> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
}

/// Reject uploads the engine cannot work with before any file is written.
fn validate_upload(filename: &str, content: &[u8]) -> Result<()> {
    if content.is_empty() {
        return Err(Error::Validation("uploaded file is empty".into()));
    }
    match file_extension(filename) {
        Some(ext) if sl_omr::is_supported_extension(ext) => Ok(()),
        Some(ext) => Err(Error::Validation(format!(
            "unsupported input format: .{ext}"
        ))),
        None => Err(Error::Validation(
            "cannot determine input format: filename has no extension".into(),
        )),
    }
}
