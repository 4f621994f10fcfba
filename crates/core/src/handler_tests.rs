use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use super::*;
use crate::sink::{LogHandlerBus, SinkError};
use crate::Error;

struct NullSink;

#[async_trait]
impl Sink for NullSink {
    async fn deliver(&self, _bus: &LogHandlerBus) -> Result<(), SinkError> {
        Ok(())
    }
}

#[test]
fn build_requires_at_least_one_target() {
    let err = HandlerBuilder::new().build();
    assert!(matches!(err, Err(Error::NoTargets)));
}

#[test]
fn build_propagates_target_validation_errors() {
    let err = HandlerBuilder::new()
        .target(PatternBuilder::new("ERROR"))
        .build();
    assert!(matches!(err, Err(Error::NoSinks(_))));
}

#[test]
fn build_assigns_sequential_ordinals_across_targets() {
    let h = HandlerBuilder::new()
        .target(PatternBuilder::new("ERROR").sink(Arc::new(NullSink)))
        .target(PatternBuilder::new("WARN").sink(Arc::new(NullSink)))
        .build()
        .expect("valid handler");
    assert!(h.targets().search(b"ERROR x"));
    assert!(h.targets().search(b"WARN x"));
    assert!(!h.targets().search(b"INFO x"));
}

#[test]
fn default_expire_at_falls_back_to_one_hour() {
    let h = HandlerBuilder::new()
        .target(PatternBuilder::new("x").sink(Arc::new(NullSink)))
        .build()
        .expect("valid handler");
    let now = SystemTime::UNIX_EPOCH;
    let expire = h.default_expire_at(now);
    assert_eq!(
        expire.duration_since(now).expect("after now"),
        Duration::from_secs(3600)
    );
}

#[test]
fn explicit_expire_at_overrides_expire_dur() {
    let fixed = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
    let h = HandlerBuilder::new()
        .target(PatternBuilder::new("x").sink(Arc::new(NullSink)))
        .expire_dur(Duration::from_secs(60))
        .expire_at(fixed)
        .build()
        .expect("valid handler");
    assert_eq!(h.default_expire_at(SystemTime::UNIX_EPOCH), fixed);
}

#[test]
fn invalid_multi_line_start_pattern_is_rejected() {
    let err = HandlerBuilder::new().merge_multi("[unterminated");
    assert!(matches!(err, Err(Error::InvalidStartPattern(_))));
}

#[test]
fn target_list_preserves_registration_order_for_diagnostics() {
    let h = HandlerBuilder::new()
        .target(PatternBuilder::new("ERROR").sink(Arc::new(NullSink)))
        .target(PatternBuilder::new("WARN").sink(Arc::new(NullSink)))
        .build()
        .expect("valid handler");
    let contents: Vec<_> = h.target_list().iter().map(|p| p.content()).collect();
    assert_eq!(contents, vec![b"ERROR".as_slice(), b"WARN".as_slice()]);
}

#[test]
fn need_collect_predicate_is_applied() {
    let h = HandlerBuilder::new()
        .target(PatternBuilder::new("x").sink(Arc::new(NullSink)))
        .need_collect(|name| name.ends_with(".log"))
        .build()
        .expect("valid handler");
    assert!(h.has_need_collect());
    assert_eq!(h.need_collect("a.log"), Some(true));
    assert_eq!(h.need_collect("a.txt"), Some(false));
}
