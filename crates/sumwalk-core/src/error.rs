//! Error types for the digest pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Permission denied for the root path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error on the root path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The directory walk failed; the work queue was closed and drained first.
    #[error("Traversal failed at {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A pipeline thread could not be started.
    #[error("Failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The traversal thread panicked.
    #[error("Path producer panicked")]
    ProducerPanicked,

    /// A digest worker panicked.
    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },
}

impl PipelineError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether the error came from walking the tree.
    pub fn is_traversal(&self) -> bool {
        matches!(self, Self::Traversal { .. })
    }
}

/// Per-file digest failure. Never fatal to the pipeline.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("error opening file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    /// Path the failure refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_io() {
        let err = PipelineError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, PipelineError::PermissionDenied { .. }));

        let err = PipelineError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        );
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_traversal_flag() {
        let err = PipelineError::Traversal {
            path: PathBuf::from("/root/locked"),
            message: "Permission denied".into(),
        };
        assert!(err.is_traversal());
        assert!(err.to_string().contains("/root/locked"));
    }
}
