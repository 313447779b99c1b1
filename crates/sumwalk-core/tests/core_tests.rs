use std::io;
use std::path::PathBuf;
use std::time::Duration;

use sumwalk_core::{
    BufferedSink, CollectingSink, ContentHash, DigestAlgorithm, DigestError, DigestFailure,
    DigestResult, DigestSink, FailureKind, OutputFormat, PipelineConfig, PipelineError,
    PipelineSummary, SinkRecord, WorkItem, WorkerStats, WriterSink, default_worker_count,
};

fn digest_record(worker_id: usize, path: &str) -> SinkRecord {
    SinkRecord::Digest(DigestResult {
        worker_id,
        digest: ContentHash::new([0x11; 32]),
        path: PathBuf::from(path),
        bytes: 42,
    })
}

fn failure_record(worker_id: usize, path: &str) -> SinkRecord {
    let err = DigestError::Read {
        path: PathBuf::from(path),
        source: io::Error::new(io::ErrorKind::Other, "disk on fire"),
    };
    SinkRecord::Failure(DigestFailure::from_error(worker_id, &err))
}

#[test]
fn test_content_hash_creation_and_hex() {
    let hash = ContentHash::new([0xab; 32]);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hex.starts_with("ab"));
    assert_eq!(hash.to_string(), hex);

    assert_eq!(hash, ContentHash::new([0xab; 32]));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));
}

#[test]
fn test_work_item_path() {
    let item = WorkItem::from(PathBuf::from("/data/a.bin"));
    assert_eq!(item.path(), PathBuf::from("/data/a.bin").as_path());
    assert_eq!(item.into_path(), PathBuf::from("/data/a.bin"));
}

#[test]
fn test_text_line_layout() {
    let line = digest_record(3, "/data/a.bin").to_string();
    let fields: Vec<&str> = line.split("  ").collect();

    assert_eq!(fields, vec![&"11".repeat(32)[..], "3", "/data/a.bin"]);
}

#[test]
fn test_failure_line_names_path_and_cause() {
    let record = failure_record(1, "/data/broken.bin");
    assert!(record.is_failure());
    assert_eq!(record.worker_id(), 1);

    let line = record.to_string();
    assert!(line.starts_with("error reading file /data/broken.bin"));
    assert!(line.contains("disk on fire"));
}

#[test]
fn test_json_records_are_tagged() {
    let digest = OutputFormat::Json.render(&digest_record(0, "/a")).unwrap();
    let failure = OutputFormat::Json.render(&failure_record(0, "/b")).unwrap();

    let digest: serde_json::Value = serde_json::from_str(&digest).unwrap();
    let failure: serde_json::Value = serde_json::from_str(&failure).unwrap();

    assert_eq!(digest["type"], "digest");
    assert_eq!(digest["digest"], "11".repeat(32));
    assert_eq!(digest["bytes"], 42);
    assert_eq!(failure["type"], "failure");
    assert_eq!(failure["kind"], "read");
}

#[test]
fn test_sinks_accept_records_from_many_threads() {
    let sink = CollectingSink::new();

    std::thread::scope(|s| {
        for worker_id in 0..4 {
            let sink = &sink;
            s.spawn(move || {
                for i in 0..25 {
                    sink.emit(digest_record(worker_id, &format!("/w{worker_id}/{i}")));
                }
            });
        }
    });

    assert_eq!(sink.len(), 100);
    assert!(sink.failures().is_empty());
}

#[test]
fn test_writer_sink_lines_are_whole() {
    let sink = WriterSink::new(Vec::new());

    std::thread::scope(|s| {
        for worker_id in 0..4 {
            let sink = &sink;
            s.spawn(move || {
                for i in 0..50 {
                    sink.emit(digest_record(worker_id, &format!("/w{worker_id}/{i}")));
                }
            });
        }
    });

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(text.lines().count(), 200);
    assert!(text.lines().all(|l| l.split("  ").count() == 3));
}

#[test]
fn test_buffered_sink_holds_until_drain() {
    let sink = BufferedSink::new();
    sink.emit(digest_record(0, "/a"));
    sink.emit(failure_record(1, "/b"));
    assert_eq!(sink.len(), 2);

    let mut out = Vec::new();
    sink.drain_into(&mut out).unwrap();
    assert!(sink.is_empty());
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
}

#[test]
fn test_summary_folds_worker_stats() {
    let mut first = WorkerStats::new(1);
    first.record_digest(10);
    first.record_failure();
    let mut second = WorkerStats::new(0);
    second.record_digest(5);
    second.record_digest(7);

    let summary = PipelineSummary::new(
        PathBuf::from("/data"),
        DigestAlgorithm::Sha256,
        Duration::from_millis(5),
        4,
        0,
        vec![first, second],
    );

    assert_eq!(summary.workers, 2);
    assert_eq!(summary.files_digested, 3);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.bytes_hashed, 22);
    assert_eq!(summary.per_worker[0].worker_id, 0);
    assert!(summary.is_complete());
    assert!(summary.has_failures());
}

#[test]
fn test_worker_policy() {
    assert_eq!(default_worker_count(16), 8);
    assert_eq!(default_worker_count(3), 1);
    assert_eq!(default_worker_count(1), 1);
    assert!(PipelineConfig::default().effective_workers() >= 1);
}

#[test]
fn test_config_builder() {
    let config = PipelineConfig::builder()
        .root("/data")
        .workers(6usize)
        .queue_capacity(8usize)
        .algorithm(DigestAlgorithm::Blake3)
        .build()
        .unwrap();

    assert_eq!(config.root, PathBuf::from("/data"));
    assert_eq!(config.effective_workers(), 6);
    assert_eq!(config.queue_capacity, 8);
    assert_eq!(config.algorithm, DigestAlgorithm::Blake3);
    assert!(config.include_hidden);
    assert!(!config.skip_walk_errors);
}

#[test]
fn test_io_error_mapping() {
    let not_found = PipelineError::io("/x", io::Error::from(io::ErrorKind::NotFound));
    let denied = PipelineError::io("/x", io::Error::from(io::ErrorKind::PermissionDenied));

    assert!(matches!(not_found, PipelineError::NotFound { .. }));
    assert!(matches!(denied, PipelineError::PermissionDenied { .. }));
    assert!(!denied.is_traversal());
}

#[test]
fn test_failure_kind_from_error() {
    let err = DigestError::Open {
        path: PathBuf::from("/gone"),
        source: io::Error::from(io::ErrorKind::NotFound),
    };
    let failure = DigestFailure::from_error(7, &err);

    assert_eq!(failure.kind, FailureKind::Open);
    assert_eq!(failure.worker_id, 7);
    assert_eq!(failure.path, PathBuf::from("/gone"));
}

#[test]
fn test_json_record_reads_back() {
    let record = digest_record(2, "/data/a.bin");
    let line = OutputFormat::Json.render(&record).unwrap();

    let parsed: SinkRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed, record);

    let bad = line.replace(&"11".repeat(32), "zz");
    assert!(serde_json::from_str::<SinkRecord>(&bad).is_err());
}

#[test]
fn test_builder_errors_are_invalid_config() {
    let missing_root = PipelineConfig::builder().workers(2usize).build().unwrap_err();
    assert!(matches!(missing_root, PipelineError::InvalidConfig { .. }));
    assert!(missing_root.to_string().contains("Root path is required"));

    let zero_buffer = PipelineConfig::builder()
        .root("/data")
        .buffer_size(0usize)
        .build()
        .unwrap_err();
    assert!(matches!(zero_buffer, PipelineError::InvalidConfig { .. }));
}

#[test]
fn test_summary_throughput() {
    let mut stats = WorkerStats::new(0);
    stats.record_digest(4096);

    let summary = PipelineSummary::new(
        PathBuf::from("/data"),
        DigestAlgorithm::Sha256,
        Duration::from_secs(2),
        1,
        0,
        vec![stats],
    );
    assert_eq!(summary.bytes_per_second(), 2048.0);

    let instant = PipelineSummary::new(
        PathBuf::from("/data"),
        DigestAlgorithm::Sha256,
        Duration::ZERO,
        0,
        0,
        Vec::new(),
    );
    assert_eq!(instant.bytes_per_second(), 0.0);
}
