//! Pipeline coordinator: one producer, N digest workers, one barrier.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::sync::WaitGroup;

use sumwalk_core::{DigestSink, PipelineConfig, PipelineError, PipelineSummary, WorkItem, WorkerStats};
use sumwalk_scan::{PathProducer, ProducerStats, WorkQueue};

use crate::digester::FileDigester;

/// Owns the lifecycle of a digest run. Does not look at the records itself.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from a config.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Walk the configured root and digest every file into `sink`.
    ///
    /// Blocks until the producer and every worker have finished. A fatal
    /// traversal error is returned only after the queue has been closed and
    /// everything already queued has been digested.
    pub fn run(&self, sink: Arc<dyn DigestSink>) -> Result<PipelineSummary, PipelineError> {
        let root = &self.config.root;
        let metadata = std::fs::metadata(root).map_err(|e| PipelineError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(PipelineError::NotADirectory { path: root.clone() });
        }

        let workers = self.config.effective_workers();
        let start = Instant::now();

        let queue = WorkQueue::<WorkItem>::new(self.config.queue_capacity);
        let queue_stats = queue.stats();
        let (queue_tx, queue_rx) = queue.into_parts();
        let barrier = WaitGroup::new();

        tracing::debug!(
            root = %root.display(),
            workers,
            capacity = self.config.queue_capacity,
            algorithm = %self.config.algorithm,
            "starting pipeline"
        );

        let producer = PathProducer::new(&self.config);
        let producer_handle = spawn_participant("sumwalk-walk".to_string(), barrier.clone(), move || {
            producer.run(queue_tx)
        })?;

        let mut worker_handles: Vec<(usize, JoinHandle<WorkerStats>)> = Vec::with_capacity(workers);
        let mut spawn_error = None;
        for worker_id in 0..workers {
            let digester = FileDigester::new(worker_id, self.config.algorithm, self.config.buffer_size);
            let queue_rx = queue_rx.clone();
            let sink = Arc::clone(&sink);
            let spawned = spawn_participant(format!("sumwalk-worker-{worker_id}"), barrier.clone(), move || {
                digester.run(queue_rx, sink.as_ref())
            });
            match spawned {
                Ok(handle) => worker_handles.push((worker_id, handle)),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        // Only the workers hold the consumer end now. If none of them are
        // alive the producer sees a disconnected queue and stops.
        drop(queue_rx);

        barrier.wait();
        let elapsed = start.elapsed();

        let producer_result = producer_handle.join().map_err(|_| PipelineError::ProducerPanicked);

        let mut per_worker = Vec::with_capacity(worker_handles.len());
        let mut panicked = None;
        for (worker_id, handle) in worker_handles {
            match handle.join() {
                Ok(stats) => per_worker.push(stats),
                Err(_) => {
                    tracing::error!(worker = worker_id, "worker panicked");
                    panicked.get_or_insert(worker_id);
                }
            }
        }

        if let Some(err) = spawn_error {
            return Err(err);
        }
        let ProducerStats {
            files_queued,
            walk_errors,
            ..
        } = producer_result??;
        if let Some(worker_id) = panicked {
            return Err(PipelineError::WorkerPanicked { worker_id });
        }

        debug_assert_eq!(queue_stats.dequeued(), queue_stats.enqueued());

        let summary = PipelineSummary::new(
            root.clone(),
            self.config.algorithm,
            elapsed,
            files_queued,
            walk_errors,
            per_worker,
        );

        tracing::info!(
            workers = summary.workers,
            files = summary.files_digested,
            failed = summary.files_failed,
            elapsed = ?summary.elapsed,
            "pipeline drained"
        );

        Ok(summary)
    }
}

/// Spawn a named thread that counts toward `barrier` until it returns or unwinds.
fn spawn_participant<T, F>(name: String, barrier: WaitGroup, f: F) -> Result<JoinHandle<T>, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _done = barrier;
            f()
        })
        .map_err(|source| PipelineError::Spawn { name, source })
}
