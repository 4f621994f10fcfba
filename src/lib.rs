// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pslog`: an embedded log-tailing and pattern-dispatch engine.
//!
//! Re-exports the public surface of `pslog-core` (the data model),
//! `pslog-adapters` (the I/O layer), and `pslog-engine` (orchestration) so
//! a host only needs this one crate as a dependency.

pub use pslog_adapters::{
    FsOffsetWriter, HandlePool, OffsetError, OffsetStore, OffsetWriter, StdoutSink, WatchError,
    WatchEvent, Watcher,
};
pub use pslog_core::{
    CompiledHandler, Error as CoreError, HandlerBuilder, LogHandlerBus, PatternBuilder,
    PersistPolicy, Sink, SinkError,
};
pub use pslog_engine::{Engine, EngineError, EngineOptions};
