//! Directory traversal and work distribution for sumwalk.
//!
//! This crate owns the producer side of the digest pipeline:
//!
//! - **[`WorkQueue`]**: a bounded multi-consumer queue. One producer pushes,
//!   any number of consumers pull, and each item is delivered exactly once.
//!   Closing is tied to dropping the single [`QueueProducer`].
//! - **[`PathProducer`]**: walks a directory tree with jwalk and pushes every
//!   regular file onto the queue, closing it when the walk ends (successfully
//!   or not).
//!
//! # Example
//!
//! ```rust,no_run
//! use sumwalk_core::{PipelineConfig, WorkItem};
//! use sumwalk_scan::{PathProducer, WorkQueue};
//!
//! let config = PipelineConfig::new("/path/to/tree");
//! let (producer, consumer) = WorkQueue::<WorkItem>::new(16).into_parts();
//!
//! let walker = std::thread::spawn(move || PathProducer::new(&config).run(producer));
//! while let Some(item) = consumer.pull() {
//!     println!("{}", item.path().display());
//! }
//! let stats = walker.join().unwrap().unwrap();
//! println!("{} files queued", stats.files_queued);
//! ```

mod producer;
mod queue;

pub use producer::{PathProducer, ProducerStats};
pub use queue::{QueueClosed, QueueConsumer, QueueProducer, QueueStats, WorkQueue};
