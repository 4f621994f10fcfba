use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pslog_core::test_support::FakeSink;
use pslog_core::{HandlerBuilder, PatternBuilder};

use super::*;

fn handler() -> CompiledHandler {
    HandlerBuilder::new()
        .change(-1)
        .target(PatternBuilder::new("ERROR").sink(Arc::new(FakeSink::new())))
        .build()
        .expect("valid handler")
}

#[test]
fn new_file_starts_at_offset_zero() {
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), handler(), SystemTime::now());
    assert_eq!(entry.offset(), 0);
    assert_eq!(entry.begin_offset(), 0);
    assert!(!entry.has_advanced());
}

#[test]
fn set_offset_marks_the_entry_as_advanced() {
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), handler(), SystemTime::now());
    entry.set_offset(26);
    assert!(entry.has_advanced());
}

#[test]
fn reset_offset_realigns_begin_offset() {
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), handler(), SystemTime::now());
    entry.set_offset(26);
    entry.reset_offset(0);
    assert!(!entry.has_advanced());
}

#[test]
fn persist_policy_every_always_persists() {
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), handler(), SystemTime::now());
    assert!(entry.should_persist(false));
    assert!(entry.should_persist(false));
}

#[test]
fn persist_policy_every_n_persists_past_threshold() {
    let h = HandlerBuilder::new()
        .change(3)
        .target(PatternBuilder::new("x").sink(Arc::new(FakeSink::new())))
        .build()
        .expect("valid handler");
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), h, SystemTime::now());
    assert!(!entry.should_persist(false));
    assert!(!entry.should_persist(false));
    assert!(!entry.should_persist(false));
    assert!(entry.should_persist(false));
    // Counter reset after the forced persist.
    assert!(!entry.should_persist(false));
}

#[test]
fn forced_persist_bypasses_the_counter() {
    let h = HandlerBuilder::new()
        .change(100)
        .target(PatternBuilder::new("x").sink(Arc::new(FakeSink::new())))
        .build()
        .expect("valid handler");
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), h, SystemTime::now());
    assert!(entry.should_persist(true));
}

#[test]
fn directory_entry_creates_children_lazily_via_need_collect() {
    let h = HandlerBuilder::new()
        .change(-1)
        .target(PatternBuilder::new("x").sink(Arc::new(FakeSink::new())))
        .need_collect(|name| name.ends_with(".log"))
        .build()
        .expect("valid handler");
    let dir = FileEntry::new_dir("/tmp".into(), "logs".into(), h, SystemTime::now());

    assert!(dir
        .child_or_create("keep.txt", SystemTime::now(), || 0)
        .is_none());
    let child = dir
        .child_or_create("a.log", SystemTime::now(), || 7)
        .expect("collected child");
    assert_eq!(child.name(), "a.log");
    assert_eq!(child.dir(), std::path::Path::new("/tmp/logs"));
    assert_eq!(child.offset(), 7);

    let again = dir
        .child_or_create("a.log", SystemTime::now(), || {
            panic!("init_offset must not run again for a cached child")
        })
        .expect("same child returned");
    assert!(Arc::ptr_eq(&child, &again));
    assert_eq!(dir.children_snapshot().len(), 1);
}

#[test]
fn expire_at_uses_handler_default_expiry() {
    let entry = FileEntry::new_file("/tmp".into(), "a.log".into(), handler(), SystemTime::UNIX_EPOCH);
    assert_eq!(
        entry
            .expire_at()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("after epoch"),
        Duration::from_secs(3600)
    );
}
