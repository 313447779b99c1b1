//! Run statistics returned by the coordinator.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::record::DigestAlgorithm;

/// Counters kept privately by a single worker and handed back when it exits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Identifier of the worker.
    pub worker_id: usize,
    /// Files digested successfully.
    pub files_digested: u64,
    /// Files that failed to open or read.
    pub files_failed: u64,
    /// Bytes streamed through the hash.
    pub bytes_hashed: u64,
}

impl WorkerStats {
    /// Create empty stats for a worker.
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Record a successfully digested file.
    pub fn record_digest(&mut self, bytes: u64) {
        self.files_digested += 1;
        self.bytes_hashed += bytes;
    }

    /// Record a failed file.
    pub fn record_failure(&mut self) {
        self.files_failed += 1;
    }

    /// Files this worker pulled from the queue.
    pub fn files_handled(&self) -> u64 {
        self.files_digested + self.files_failed
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Root path that was walked.
    pub root: PathBuf,
    /// Hash function used.
    pub algorithm: DigestAlgorithm,
    /// Number of digest workers.
    pub workers: usize,
    /// Wall-clock time from start to full drain.
    pub elapsed: Duration,
    /// Files pushed onto the work queue.
    pub files_queued: u64,
    /// Files digested successfully.
    pub files_digested: u64,
    /// Files reported as failures.
    pub files_failed: u64,
    /// Total bytes hashed.
    pub bytes_hashed: u64,
    /// Walk errors skipped (only non-zero with `skip_walk_errors`).
    pub walk_errors: u64,
    /// Per-worker breakdown, ordered by worker id.
    pub per_worker: Vec<WorkerStats>,
}

impl PipelineSummary {
    /// Fold worker stats into a summary.
    pub fn new(
        root: PathBuf,
        algorithm: DigestAlgorithm,
        elapsed: Duration,
        files_queued: u64,
        walk_errors: u64,
        mut per_worker: Vec<WorkerStats>,
    ) -> Self {
        per_worker.sort_by_key(|w| w.worker_id);

        let files_digested = per_worker.iter().map(|w| w.files_digested).sum();
        let files_failed = per_worker.iter().map(|w| w.files_failed).sum();
        let bytes_hashed = per_worker.iter().map(|w| w.bytes_hashed).sum();

        Self {
            root,
            algorithm,
            workers: per_worker.len(),
            elapsed,
            files_queued,
            files_digested,
            files_failed,
            bytes_hashed,
            walk_errors,
            per_worker,
        }
    }

    /// Every queued file produced exactly one record.
    pub fn is_complete(&self) -> bool {
        self.files_digested + self.files_failed == self.files_queued
    }

    /// Check if any file failed.
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Hash throughput in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_hashed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}
