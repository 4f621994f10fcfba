// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok())
}

/// Bound of the watcher's output channel when the host does not specify
/// one explicitly (default: 16, per the watcher's delivery contract).
pub fn watch_channel_capacity() -> usize {
    parse_u64("PSLOG_WATCH_CHANNEL_CAPACITY").unwrap_or(16) as usize
}

/// Offset sidecar GC threshold: files under `.pslog/offset/` older than
/// this are removed on entry initialization (default: 3 days).
pub fn offset_sidecar_max_age() -> Duration {
    parse_u64("PSLOG_OFFSET_SIDECAR_MAX_AGE_SECS")
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(3 * 24 * 3600))
}

/// Default file-handle pool capacity when the host does not specify one.
pub fn default_handle_pool_capacity() -> usize {
    parse_u64("PSLOG_HANDLE_POOL_CAPACITY").unwrap_or(64) as usize
}
