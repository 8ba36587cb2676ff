//! Bounded worker pool for conversion tasks.
//!
//! [`WorkerPool`] decouples request acceptance from processing latency:
//! `submit` spawns the task immediately and returns, while a semaphore caps
//! how many task bodies run at once. Submissions beyond the cap queue on the
//! semaphore; nothing is ever dropped. Task panics are isolated per tokio
//! task and cannot take a slot out of service.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

/// Fixed-parallelism executor for background conversions.
#[derive(Debug)]
pub struct WorkerPool {
    slots: usize,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl WorkerPool {
    /// Create a pool with `slots` concurrent execution slots.
    pub fn new(slots: usize) -> Self {
        Self {
            slots,
            semaphore: Arc::new(Semaphore::new(slots)),
            tracker: TaskTracker::new(),
        }
    }

    /// Enqueue a task for execution, returning immediately.
    ///
    /// The task starts once a slot frees up. Domain errors are the task
    /// body's responsibility; the pool neither observes nor logs them.
    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        self.tracker.spawn(async move {
            // Acquire fails only if the semaphore is closed, which never
            // happens during normal operation.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            task.await;
        });
    }

    /// Number of execution slots.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.slots.saturating_sub(self.semaphore.available_permits())
    }

    /// Tasks submitted but not yet finished (running or queued).
    pub fn outstanding(&self) -> usize {
        self.tracker.len()
    }

    /// Drain the pool: refuse new submissions and wait for every queued and
    /// in-flight task to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
