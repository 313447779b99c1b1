//! JWalk-based path producer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use sumwalk_core::{PipelineConfig, PipelineError, WorkItem};

use crate::queue::QueueProducer;

/// Counters returned by a finished walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Regular files pushed onto the queue.
    pub files_queued: u64,
    /// Directories visited.
    pub dirs_seen: u64,
    /// Walk errors that were logged and skipped.
    pub walk_errors: u64,
}

/// Walks a directory tree once and feeds every regular file to the work queue.
#[derive(Debug, Clone)]
pub struct PathProducer {
    root: PathBuf,
    follow_symlinks: bool,
    include_hidden: bool,
    max_depth: Option<u32>,
    skip_walk_errors: bool,
}

impl PathProducer {
    /// Create a producer from the traversal settings of a pipeline config.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            root: config.root.clone(),
            follow_symlinks: config.follow_symlinks,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
            skip_walk_errors: config.skip_walk_errors,
        }
    }

    /// Root this producer walks.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, pushing each regular file, then close the queue.
    ///
    /// The queue is closed on every exit path, including a fatal walk error,
    /// so consumers always drain and stop.
    pub fn run(self, queue: QueueProducer<WorkItem>) -> Result<ProducerStats, PipelineError> {
        let result = self.walk(&queue);
        queue.close();
        result
    }

    fn walk(&self, queue: &QueueProducer<WorkItem>) -> Result<ProducerStats, PipelineError> {
        let mut stats = ProducerStats::default();

        if let Err(err) = fs::metadata(&self.root) {
            self.walk_error(&mut stats, self.root.clone(), err.to_string())?;
            return Ok(stats);
        }

        // Serial + sorted keeps the discovery order stable from run to run.
        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!self.include_hidden)
            .follow_links(self.follow_symlinks)
            .min_depth(0)
            .max_depth(self.max_depth.map(|d| d as usize).unwrap_or(usize::MAX));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_else(|| self.root.clone());
                    // Following links turns a dangling one into an entry error.
                    if self.follow_symlinks && is_dangling_symlink(&path) {
                        tracing::trace!(path = %path.display(), "skipping dangling symlink");
                        continue;
                    }
                    self.walk_error(&mut stats, path, err.to_string())?;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.dirs_seen += 1;
                // jwalk reports unreadable directories on the entry, not the iterator.
                if let Some(err) = &entry.read_children_error {
                    self.walk_error(&mut stats, entry.path(), err.to_string())?;
                }
                continue;
            }

            let path = entry.path();
            let is_file = if file_type.is_symlink() {
                // Unfollowed link: queue it only when it resolves to a regular file.
                fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false)
            } else {
                file_type.is_file()
            };
            if !is_file {
                tracing::trace!(path = %path.display(), "skipping non-regular entry");
                continue;
            }

            if queue.push(WorkItem::new(path)).is_err() {
                tracing::warn!("work queue lost its consumers, stopping walk");
                break;
            }
            stats.files_queued += 1;
        }

        tracing::debug!(
            root = %self.root.display(),
            files = stats.files_queued,
            dirs = stats.dirs_seen,
            "walk finished"
        );
        Ok(stats)
    }

    /// Fail the walk, or log and count the error when configured to skip.
    fn walk_error(
        &self,
        stats: &mut ProducerStats,
        path: PathBuf,
        message: String,
    ) -> Result<(), PipelineError> {
        if self.skip_walk_errors {
            tracing::warn!(path = %path.display(), "skipping walk error: {message}");
            stats.walk_errors += 1;
            return Ok(());
        }
        Err(PipelineError::Traversal { path, message })
    }
}

fn is_dangling_symlink(path: &Path) -> bool {
    let is_link = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    is_link && matches!(fs::metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}
