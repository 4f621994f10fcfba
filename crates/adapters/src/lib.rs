// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pslog-adapters: the I/O-facing layer around pslog-core's pure data
//! model — the directory/file watcher, the offset sidecar store, a
//! bounded file-handle pool, and the built-in stdout sink.

mod env;
mod error;
mod handle_pool;
mod offset_store;
mod stdout_sink;
mod watcher;

pub use env::{default_handle_pool_capacity, watch_channel_capacity};
pub use error::{OffsetError, WatchError};
pub use handle_pool::HandlePool;
pub use offset_store::{FsOffsetWriter, OffsetStore, OffsetWriter};
pub use stdout_sink::StdoutSink;
pub use watcher::{WatchEvent, Watcher};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
