//! Work items and the records emitted for them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::DigestError;

/// 32-byte content digest (SHA-256 or BLAKE3). Serializes as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 64 || !hex.is_ascii() {
            return Err(de::Error::invalid_length(hex.len(), &"64 hex characters"));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(de::Error::custom)?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Hash function used to digest file contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Lowercase algorithm name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single discovered file waiting to be digested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem(PathBuf);

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl From<PathBuf> for WorkItem {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Successful digest of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestResult {
    /// Worker that processed the file, in `[0, workers)`.
    pub worker_id: usize,
    /// Content digest.
    pub digest: ContentHash,
    /// Path as discovered by the traversal.
    pub path: PathBuf,
    /// Number of bytes streamed through the hash.
    pub bytes: u64,
}

impl fmt::Display for DigestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}  {}", self.digest, self.worker_id, self.path.display())
    }
}

/// Stage at which digesting a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The file could not be opened.
    Open,
    /// Reading the file failed part way through.
    Read,
}

impl FailureKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Open => "opening file",
            Self::Read => "reading file",
        }
    }
}

/// Per-file failure reported in place of a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestFailure {
    /// Worker that attempted the file.
    pub worker_id: usize,
    /// Path that could not be digested.
    pub path: PathBuf,
    /// Where the failure happened.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl DigestFailure {
    /// Build a failure record from a digest error.
    pub fn from_error(worker_id: usize, error: &DigestError) -> Self {
        let (kind, path, source) = match error {
            DigestError::Open { path, source } => (FailureKind::Open, path, source),
            DigestError::Read { path, source } => (FailureKind::Read, path, source),
        };
        Self {
            worker_id,
            path: path.clone(),
            kind,
            message: source.to_string(),
        }
    }
}

impl fmt::Display for DigestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error {} {}: {}",
            self.kind.describe(),
            self.path.display(),
            self.message
        )
    }
}

/// Everything a worker can hand to a [`DigestSink`](crate::DigestSink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkRecord {
    Digest(DigestResult),
    Failure(DigestFailure),
}

impl SinkRecord {
    /// Path the record refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Digest(result) => &result.path,
            Self::Failure(failure) => &failure.path,
        }
    }

    /// Worker that produced the record.
    pub fn worker_id(&self) -> usize {
        match self {
            Self::Digest(result) => result.worker_id,
            Self::Failure(failure) => failure.worker_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl From<DigestResult> for SinkRecord {
    fn from(result: DigestResult) -> Self {
        Self::Digest(result)
    }
}

impl From<DigestFailure> for SinkRecord {
    fn from(failure: DigestFailure) -> Self {
        Self::Failure(failure)
    }
}

impl fmt::Display for SinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(result) => fmt::Display::fmt(result, f),
            Self::Failure(failure) => fmt::Display::fmt(failure, f),
        }
    }
}
