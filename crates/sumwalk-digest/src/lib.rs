//! Digest workers and pipeline coordination for sumwalk.
//!
//! A run is one [`PathProducer`](sumwalk_scan::PathProducer) thread feeding a
//! bounded [`WorkQueue`](sumwalk_scan::WorkQueue) and a fixed pool of
//! [`FileDigester`] workers draining it:
//!
//! 1. The [`Pipeline`] creates the queue and starts the producer.
//! 2. It starts `workers` digesters with ids `0..workers`.
//! 3. Each digester streams files through SHA-256 (or BLAKE3) and emits one
//!    record per file to the shared [`DigestSink`].
//! 4. The pipeline waits on a completion barrier for all `workers + 1`
//!    threads and returns a [`PipelineSummary`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sumwalk_core::{PipelineConfig, WriterSink};
//! use sumwalk_digest::Pipeline;
//!
//! let pipeline = Pipeline::new(PipelineConfig::new("/path/to/tree"));
//! let summary = pipeline.run(Arc::new(WriterSink::new(std::io::stdout()))).unwrap();
//! eprintln!("workers={} elapsed={:?}", summary.workers, summary.elapsed);
//! ```

mod digester;
mod pipeline;

pub use digester::{FileDigester, digest_reader};
pub use pipeline::Pipeline;

// Re-export core types for convenience
pub use sumwalk_core::{
    ContentHash, DigestAlgorithm, DigestError, DigestSink, PipelineConfig, PipelineError,
    PipelineSummary, SinkRecord, WorkItem, WorkerStats,
};
