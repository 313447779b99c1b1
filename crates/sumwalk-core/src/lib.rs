//! Core types and traits for sumwalk.
//!
//! This crate holds the data model shared by the scanning and digesting
//! crates: work items, digest records, output sinks, configuration,
//! errors and run statistics.

mod config;
mod error;
mod policy;
mod record;
pub mod sink;
mod summary;

pub use config::{DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_CAPACITY, PipelineConfig, PipelineConfigBuilder};
pub use error::{DigestError, PipelineError};
pub use policy::{available_parallelism, default_worker_count};
pub use record::{ContentHash, DigestAlgorithm, DigestFailure, DigestResult, FailureKind, SinkRecord, WorkItem};
pub use sink::{BufferedSink, CollectingSink, DigestSink, OutputFormat, WriterSink};
pub use summary::{PipelineSummary, WorkerStats};
