//! Output sinks for digest records.
//!
//! Workers never print directly. Each one is handed a shared
//! [`DigestSink`] and calls [`DigestSink::emit`] once per file, so the
//! destination (terminal, in-memory buffer, test collector) can be swapped
//! without touching worker logic.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::record::{DigestFailure, DigestResult, SinkRecord};

/// Destination for per-file records. Shared by every worker.
pub trait DigestSink: Send + Sync {
    /// Accept one record. Must not panic on output errors.
    fn emit(&self, record: SinkRecord);
}

/// Line format used by the writing sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<hex digest>  <worker id>  <path>`, or an `error ...` diagnostic.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    /// Render a record as a single line, without the trailing newline.
    pub fn render(self, record: &SinkRecord) -> Result<String, serde_json::Error> {
        match self {
            Self::Text => Ok(record.to_string()),
            Self::Json => serde_json::to_string(record),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writes each record immediately, one line per record.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    format: OutputFormat,
}

impl<W: Write + Send> WriterSink<W> {
    /// Create a sink writing text lines.
    pub fn new(writer: W) -> Self {
        Self::with_format(writer, OutputFormat::Text)
    }

    /// Create a sink with an explicit line format.
    pub fn with_format(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&self) -> io::Result<()> {
        lock(&self.writer).flush()
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> DigestSink for WriterSink<W> {
    fn emit(&self, record: SinkRecord) {
        let line = match self.format.render(&record) {
            Ok(line) => line,
            Err(err) => {
                tracing::error!(path = %record.path().display(), "failed to encode record: {err}");
                return;
            }
        };

        let mut writer = lock(&self.writer);
        if let Err(err) = writeln!(writer, "{line}") {
            tracing::error!(path = %record.path().display(), "failed to write record: {err}");
        }
    }
}

/// Keeps formatted lines in memory until [`drain_into`](Self::drain_into).
#[derive(Default)]
pub struct BufferedSink {
    lines: Mutex<Vec<String>>,
    format: OutputFormat,
}

impl BufferedSink {
    /// Create an empty text buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with an explicit line format.
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            format,
        }
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        lock(&self.lines).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every buffered line to `out` and clear the buffer.
    pub fn drain_into<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let lines = std::mem::take(&mut *lock(&self.lines));
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

impl DigestSink for BufferedSink {
    fn emit(&self, record: SinkRecord) {
        match self.format.render(&record) {
            Ok(line) => lock(&self.lines).push(line),
            Err(err) => {
                tracing::error!(path = %record.path().display(), "failed to encode record: {err}");
            }
        }
    }
}

/// Collects raw records for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<SinkRecord>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record received so far.
    pub fn records(&self) -> Vec<SinkRecord> {
        lock(&self.records).clone()
    }

    /// Successful digests received so far.
    pub fn digests(&self) -> Vec<DigestResult> {
        lock(&self.records)
            .iter()
            .filter_map(|r| match r {
                SinkRecord::Digest(result) => Some(result.clone()),
                SinkRecord::Failure(_) => None,
            })
            .collect()
    }

    /// Failures received so far.
    pub fn failures(&self) -> Vec<DigestFailure> {
        lock(&self.records)
            .iter()
            .filter_map(|r| match r {
                SinkRecord::Failure(failure) => Some(failure.clone()),
                SinkRecord::Digest(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DigestSink for CollectingSink {
    fn emit(&self, record: SinkRecord) {
        lock(&self.records).push(record);
    }
}
