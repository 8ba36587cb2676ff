//! Bounded retention for finished jobs.
//!
//! Job records and their temp files are ephemeral, but without eviction a
//! long-lived process grows without bound. The sweeper periodically removes
//! terminal jobs whose finish time is older than the configured TTL, together
//! with their input and output files. Pending and processing jobs are never
//! touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use sl_core::config::RetentionConfig;
use sl_core::Job;

use crate::store::JobStore;

/// Run the eviction loop until the cancellation token fires.
pub async fn run_sweeper(store: Arc<JobStore>, config: RetentionConfig, cancel: CancellationToken) {
    if !config.enabled {
        tracing::info!("Retention sweeper disabled");
        return;
    }

    let interval = Duration::from_secs(config.sweep_interval_secs.max(1));
    let ttl = chrono::Duration::seconds(config.ttl_secs as i64);
    tracing::info!(
        ttl_secs = config.ttl_secs,
        interval_secs = interval.as_secs(),
        "Retention sweeper started"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => break,
        }

        let evicted = sweep_once(&store, ttl).await;
        if evicted > 0 {
            tracing::info!(evicted, "Evicted expired jobs");
        }
    }

    tracing::info!("Retention sweeper stopped");
}

/// Evict every terminal job that finished before `now - ttl`.
///
/// Returns the number of evicted records. File removal is best-effort: a
/// record is dropped even when its files are already gone.
pub async fn sweep_once(store: &JobStore, ttl: chrono::Duration) -> usize {
    let cutoff = Utc::now() - ttl;
    let expired: Vec<Job> = store
        .list()
        .into_iter()
        .filter(|job| {
            job.status.is_terminal() && job.finished_at.is_some_and(|t| t < cutoff)
        })
        .collect();

    let mut evicted = 0;
    for job in expired {
        if store.remove(job.id).is_none() {
            continue;
        }
        evicted += 1;

        let _ = tokio::fs::remove_file(&job.input_path).await;
        if let Some(ref output) = job.output_path {
            let _ = tokio::fs::remove_file(output).await;
        }
        tracing::debug!(job_id = %job.id, "Evicted expired job");
    }
    evicted
}
