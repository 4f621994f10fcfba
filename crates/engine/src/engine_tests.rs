use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use pslog_adapters::test_support::FakeOffsetWriter;
use pslog_core::test_support::FakeSink;
use pslog_core::{HandlerBuilder, PatternBuilder};
use tempfile::tempdir;

use super::*;

fn fake_engine() -> Engine<FakeOffsetWriter> {
    Engine::with_offset_writer(EngineOptions::new(), FakeOffsetWriter::new(SystemTime::now()))
}

fn handler() -> CompiledHandler {
    HandlerBuilder::new()
        .change(-1)
        .target(PatternBuilder::new("x").sink(Arc::new(FakeSink::new())))
        .build()
        .expect("valid handler")
}

#[tokio::test]
async fn add_paths_without_register_errors() {
    let engine = fake_engine();
    let err = engine.add_paths(&[PathBuf::from("/tmp/a.log")]).unwrap_err();
    assert!(matches!(err, EngineError::NoDefaultHandler));
    engine.close().await;
}

#[tokio::test]
async fn register_then_add_paths_initializes_offset_from_sidecar() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, "hello\n").expect("write");

    let engine = fake_engine();
    engine.register(handler()).expect("register");
    engine.add_paths(&[path.clone()]).expect("add_paths");

    let out = engine.list(false);
    assert!(out.contains("a.log"));
    engine.close().await;
}

#[tokio::test]
async fn directory_without_need_collect_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let engine = fake_engine();
    let err = engine
        .add_path2handler(dir.path().to_path_buf(), handler())
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingNeedCollect { .. }));
    engine.close().await;
}

#[tokio::test]
async fn duplicate_add_path2handler_is_silently_skipped() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, "").expect("write");

    let engine = fake_engine();
    engine
        .add_path2handler(path.clone(), handler())
        .expect("first add");
    engine
        .add_path2handler(path.clone(), handler())
        .expect("second add is a skipped no-op");
    engine.close().await;
}

#[tokio::test]
async fn replace_path2handler_overwrites_the_existing_registration() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, "").expect("write");

    let engine = fake_engine();
    engine
        .add_path2handler(path.clone(), handler())
        .expect("first add");
    engine
        .replace_path2handler(path.clone(), handler())
        .expect("replace succeeds even though already registered");
    engine.close().await;
}

#[tokio::test]
async fn cron_logs_parses_entries_not_yet_advanced_by_tail() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("a.log");
    std::fs::write(&path, "x\n").expect("write");

    let sink = Arc::new(FakeSink::new());
    let h = HandlerBuilder::new()
        .change(-1)
        .target(PatternBuilder::new("x").sink(sink.clone()))
        .build()
        .expect("valid handler");

    let engine = fake_engine();
    engine.add_path2handler(path, h).expect("add");
    engine.cron_logs(None).await.expect("cron");

    assert_eq!(sink.len(), 1);
    engine.close().await;
}

#[tokio::test]
async fn cron_logs_parses_files_inside_a_registered_directory() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.log"), "x\n").expect("write");

    let sink = Arc::new(FakeSink::new());
    let h = HandlerBuilder::new()
        .change(-1)
        .need_collect(|name| name.ends_with(".log"))
        .target(PatternBuilder::new("x").sink(sink.clone()))
        .build()
        .expect("valid handler");

    let engine = fake_engine();
    engine
        .add_path2handler(dir.path().to_path_buf(), h)
        .expect("directory registration succeeds with need_collect");

    // No tail loop is ever started: this exercises the pull-only flow.
    engine.cron_logs(None).await.expect("cron");

    assert_eq!(sink.len(), 1);
    assert!(engine.list(false).contains("a.log"));
    engine.close().await;
}

#[tokio::test]
async fn close_is_idempotent() {
    let engine = fake_engine();
    engine.close().await;
    engine.close().await;
}

#[tokio::test]
async fn operations_after_close_return_closed_error() {
    let engine = fake_engine();
    engine.close().await;
    let err = engine.register(handler()).unwrap_err();
    assert!(matches!(err, EngineError::Closed));
}
