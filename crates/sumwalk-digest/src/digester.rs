//! Streaming file digester, one per worker thread.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use sumwalk_core::{
    ContentHash, DigestAlgorithm, DigestError, DigestFailure, DigestResult, DigestSink, SinkRecord,
    WorkItem, WorkerStats,
};
use sumwalk_scan::QueueConsumer;

/// Incremental hasher over the supported algorithms.
enum StreamHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamHasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> ContentHash {
        match self {
            Self::Sha256(h) => ContentHash::new(h.finalize().into()),
            Self::Blake3(h) => ContentHash::new(*h.finalize().as_bytes()),
        }
    }
}

/// Stream everything `reader` yields through `algorithm`, using `buffer` as
/// scratch space. Returns the digest and the number of bytes read.
pub fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: DigestAlgorithm,
    buffer: &mut [u8],
) -> io::Result<(ContentHash, u64)> {
    let mut hasher = StreamHasher::new(algorithm);
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((hasher.finalize(), total))
}

/// A digest worker. Holds its id and a reusable read buffer; nothing else
/// carries over from one file to the next.
pub struct FileDigester {
    id: usize,
    algorithm: DigestAlgorithm,
    buffer: Vec<u8>,
}

impl FileDigester {
    /// Create a worker with the given id and read buffer size.
    pub fn new(id: usize, algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
        Self {
            id,
            algorithm,
            buffer: vec![0u8; buffer_size.max(1)],
        }
    }

    /// Worker identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Digest one file. The handle is closed before this returns, on every path.
    pub fn digest_file(&mut self, path: &Path) -> Result<(ContentHash, u64), DigestError> {
        let file = File::open(path).map_err(|source| DigestError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        digest_reader(file, self.algorithm, &mut self.buffer).map_err(|source| DigestError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Digest one work item and turn the outcome into a sink record.
    pub fn process(&mut self, item: WorkItem) -> SinkRecord {
        match self.digest_file(item.path()) {
            Ok((digest, bytes)) => SinkRecord::Digest(DigestResult {
                worker_id: self.id,
                digest,
                path: item.into_path(),
                bytes,
            }),
            Err(err) => {
                tracing::warn!(worker = self.id, "{err}");
                SinkRecord::Failure(DigestFailure::from_error(self.id, &err))
            }
        }
    }

    /// Pull items until the queue is closed and drained, emitting one record
    /// per item. Returns this worker's counters.
    pub fn run(mut self, queue: QueueConsumer<WorkItem>, sink: &dyn DigestSink) -> WorkerStats {
        let mut stats = WorkerStats::new(self.id);
        tracing::debug!(worker = self.id, "worker started");

        while let Some(item) = queue.pull() {
            let record = self.process(item);
            match &record {
                SinkRecord::Digest(result) => stats.record_digest(result.bytes),
                SinkRecord::Failure(_) => stats.record_failure(),
            }
            sink.emit(record);
        }

        tracing::debug!(
            worker = self.id,
            digested = stats.files_digested,
            failed = stats.files_failed,
            "worker finished"
        );
        stats
    }
}
