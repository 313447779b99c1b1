//! Pipeline configuration types.

use std::path::PathBuf;

use derive_builder::{Builder, UninitializedFieldError};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::policy::{available_parallelism, default_worker_count};
use crate::record::DigestAlgorithm;

/// Default bound of the work queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default streaming read buffer per worker (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for a digest pipeline run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "PipelineError"))]
pub struct PipelineConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// Number of digest workers (0 = half the available parallelism).
    #[builder(default = "0")]
    #[serde(default)]
    pub workers: usize,

    /// Capacity of the work queue (0 = rendezvous handoff).
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Hash function applied to file contents.
    #[builder(default)]
    #[serde(default)]
    pub algorithm: DigestAlgorithm,

    /// Size of the read buffer each worker streams through.
    #[builder(default = "DEFAULT_BUFFER_SIZE")]
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Follow symbolic links to directories while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Log and count walk errors instead of failing the run.
    #[builder(default = "false")]
    #[serde(default)]
    pub skip_walk_errors: bool,
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl PipelineConfigBuilder {
    fn validate(&self) -> Result<(), PipelineError> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err(invalid("Root path cannot be empty"));
            }
            None => return Err(invalid("Root path is required")),
            _ => {}
        }
        if self.buffer_size == Some(0) {
            return Err(invalid("Buffer size must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> PipelineError {
    PipelineError::InvalidConfig {
        message: message.to_string(),
    }
}

impl From<UninitializedFieldError> for PipelineError {
    fn from(err: UninitializedFieldError) -> Self {
        Self::InvalidConfig {
            message: err.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline config builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Create a simple config for digesting a tree.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workers: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            algorithm: DigestAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            skip_walk_errors: false,
        }
    }

    /// Worker count after applying the default policy.
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            0 => default_worker_count(available_parallelism()),
            n => n,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .root("/home/user")
            .workers(4usize)
            .algorithm(DigestAlgorithm::Blake3)
            .follow_symlinks(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.effective_workers(), 4);
        assert_eq!(config.algorithm, DigestAlgorithm::Blake3);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.follow_symlinks);
        assert!(config.include_hidden);
    }

    #[test]
    fn test_builder_rejects_empty_root() {
        let err = PipelineConfig::builder().root("").build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
        assert!(err.to_string().contains("Root path cannot be empty"));

        let err = PipelineConfig::builder().build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
    }

    #[test]
    fn test_builder_rejects_zero_buffer() {
        let result = PipelineConfig::builder()
            .root("/data")
            .buffer_size(0usize)
            .build();
        assert!(matches!(result, Err(PipelineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_effective_workers_never_zero() {
        let config = PipelineConfig::new("/data");
        assert!(config.effective_workers() >= 1);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"root": "/srv"}"#).unwrap();
        assert_eq!(config.root, PathBuf::from("/srv"));
        assert_eq!(config.workers, 0);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(config.include_hidden);
        assert!(!config.skip_walk_errors);
    }
}
