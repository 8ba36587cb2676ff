//! Concurrent in-memory job registry.
//!
//! [`JobStore`] is the only shared mutable structure in the service. Each job
//! has exactly one writer (the worker task executing it); any number of
//! status-polling readers may snapshot records concurrently. Records live
//! until the retention sweeper evicts them.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::path::PathBuf;

use sl_core::{Error, Job, JobId, JobStatus, Result};

/// Per-status record counts, for introspection.
#[derive(Debug, Clone, Copy, Default, Serialize, utoipa::ToSchema)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Thread-safe registry of job records.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<JobId, Job>,
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new pending job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the id is already present. Ids are
    /// random v4 UUIDs, so this is purely defensive.
    pub fn create(&self, id: JobId, input_path: PathBuf) -> Result<Job> {
        match self.jobs.entry(id) {
            Entry::Occupied(_) => Err(Error::Conflict(format!("job {id} already exists"))),
            Entry::Vacant(slot) => {
                let job = Job::new(id, input_path);
                slot.insert(job.clone());
                Ok(job)
            }
        }
    }

    /// Snapshot of the record for `id`, if present.
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.get(&id).map(|entry| entry.clone())
    }

    /// Atomically apply a transition to the stored record and return the
    /// updated snapshot.
    ///
    /// The map shard stays locked for the duration of `f`, so readers observe
    /// either the previous or the new state, never a partial write.
    pub fn update(&self, id: JobId, f: impl FnOnce(&mut Job) -> Result<()>) -> Result<Job> {
        let mut entry = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("job", id))?;
        f(&mut entry)?;
        Ok(entry.clone())
    }

    /// Snapshot of all records, oldest first.
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|entry| entry.clone()).collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Remove a record, returning it if it was present.
    ///
    /// Only the retention sweeper calls this.
    pub fn remove(&self, id: JobId) -> Option<Job> {
        self.jobs.remove(&id).map(|(_, job)| job)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Per-status counts across all records.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.jobs.iter() {
            match entry.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}
