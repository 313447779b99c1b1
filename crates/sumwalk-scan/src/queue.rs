//! Bounded single-producer, multi-consumer work queue.
//!
//! The queue is backed by a crossbeam bounded channel. When it is full the
//! producer blocks until a consumer pulls, which keeps traversal from running
//! arbitrarily far ahead of the workers. Closing happens when the one
//! [`QueueProducer`] is closed or dropped; consumers then drain whatever is
//! left and see `None`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

/// Delivery counters shared by both ends of a queue.
#[derive(Debug, Default)]
pub struct QueueStats {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Items accepted by the queue.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Acquire)
    }

    /// Items handed to a consumer.
    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Acquire)
    }

    /// Times the producer found the queue full and had to wait.
    pub fn backpressure_events(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }

    /// Items sitting in the queue right now.
    pub fn in_flight(&self) -> u64 {
        self.enqueued().saturating_sub(self.dequeued())
    }
}

/// Returned by [`QueueProducer::push`] when every consumer is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

impl fmt::Display for QueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("work queue has no consumers")
    }
}

impl std::error::Error for QueueClosed {}

/// A freshly created queue, split with [`into_parts`](Self::into_parts).
pub struct WorkQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    stats: Arc<QueueStats>,
}

impl<T> WorkQueue<T> {
    /// Create a queue holding at most `capacity` items (0 = rendezvous).
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = channel::bounded(capacity);
        Self {
            sender,
            receiver,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Shared delivery counters.
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Split into the single producer end and a cloneable consumer end.
    pub fn into_parts(self) -> (QueueProducer<T>, QueueConsumer<T>) {
        let producer = QueueProducer {
            sender: self.sender,
            stats: Arc::clone(&self.stats),
        };
        let consumer = QueueConsumer {
            receiver: self.receiver,
            stats: self.stats,
        };
        (producer, consumer)
    }
}

/// Pushing end. There is exactly one; dropping it closes the queue.
pub struct QueueProducer<T> {
    sender: Sender<T>,
    stats: Arc<QueueStats>,
}

impl<T> QueueProducer<T> {
    /// Push an item, blocking while the queue is full.
    pub fn push(&self, item: T) -> Result<(), QueueClosed> {
        let item = match self.sender.try_send(item) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::AcqRel);
                return Ok(());
            }
            Err(TrySendError::Disconnected(_)) => return Err(QueueClosed),
            Err(TrySendError::Full(item)) => item,
        };

        self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
        self.sender.send(item).map_err(|_| QueueClosed)?;
        self.stats.enqueued.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Signal that no more items will arrive.
    pub fn close(self) {
        tracing::debug!(enqueued = self.stats.enqueued(), "work queue closed");
    }
}

/// Pulling end. Clone one per worker.
pub struct QueueConsumer<T> {
    receiver: Receiver<T>,
    stats: Arc<QueueStats>,
}

impl<T> Clone for QueueConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T> QueueConsumer<T> {
    /// Wait for the next item. Returns `None` once the queue is closed and drained.
    pub fn pull(&self) -> Option<T> {
        let item = self.receiver.recv().ok()?;
        self.stats.dequeued.fetch_add(1, Ordering::AcqRel);
        Some(item)
    }

    /// Iterate until the queue is closed and drained.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.pull())
    }
}
