//! Job record and its state machine.
//!
//! A [`Job`] tracks one asynchronous conversion from submission to a terminal
//! state. Transitions are `pending -> processing -> completed | failed`; the
//! mutating methods reject anything else, so a record can never regress or
//! leave a terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::ids::JobId;

/// Lifecycle state of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted and queued, not yet picked up by a worker.
    Pending,
    /// A worker is running the conversion.
    Processing,
    /// Conversion finished; the artifact is available.
    Completed,
    /// Conversion failed; `error` carries the reason.
    Failed,
}

impl JobStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A tracked unit of conversion work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier, assigned at creation.
    pub id: JobId,
    /// Where the submitted document was persisted.
    pub input_path: PathBuf,
    /// Where the artifact was written; set exactly when `status` is completed.
    pub output_path: Option<PathBuf>,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Failure description; set exactly when `status` is failed.
    pub error: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When a worker picked the job up.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new pending job.
    pub fn new(id: JobId, input_path: PathBuf) -> Self {
        Self {
            id,
            input_path,
            output_path: None,
            status: JobStatus::Pending,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Transition `pending -> processing`, recording the start time.
    pub fn start(&mut self) -> Result<()> {
        if self.status != JobStatus::Pending {
            return Err(Error::Conflict(format!(
                "job {} cannot start from state {}",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Transition `processing -> completed`, recording the artifact location
    /// and finish time.
    pub fn complete(&mut self, output_path: PathBuf) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(Error::Conflict(format!(
                "job {} cannot complete from state {}",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Completed;
        self.output_path = Some(output_path);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Transition `processing -> failed`, recording the error and finish time.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(Error::Conflict(format!(
                "job {} cannot fail from state {}",
                self.id, self.status
            )));
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }
}
