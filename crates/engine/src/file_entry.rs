// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-path state: read offset, the compiled handler applied to this
//! path, and (for directory registrations) lazily-instantiated children.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex as SyncMutex;
use pslog_adapters::HandlePool;
use pslog_core::{CompiledHandler, LineAssembler, PersistPolicy};
use tokio::sync::Mutex as AsyncMutex;

/// One registered path's state. Directory registrations hold `children`
/// keyed by basename; a child's handler is the *same* `Arc`-shared
/// `CompiledHandler` as its parent (cloning `CompiledHandler` is cheap
/// and shares the immutable matcher/sinks), but each child gets its own
/// offset, expiry, and assembler state — matching the source's "clone
/// Handler per child" behavior without cloning the pattern trie.
pub struct FileEntry {
    dir: PathBuf,
    name: String,
    handler: CompiledHandler,
    is_dir: bool,
    offset: AtomicU64,
    begin_offset: AtomicU64,
    offset_change: AtomicU32,
    expire_at: SyncMutex<SystemTime>,
    assembler: SyncMutex<LineAssembler>,
    /// Serializes tail/cron parse invocations on this entry (spec
    /// invariant: no two parses of the same entry run concurrently).
    parse_lock: AsyncMutex<()>,
    children: Option<SyncMutex<HashMap<String, Arc<FileEntry>>>>,
}

impl FileEntry {
    pub fn new_file(dir: PathBuf, name: String, handler: CompiledHandler, now: SystemTime) -> Arc<Self> {
        Self::build(dir, name, handler, false, now)
    }

    pub fn new_dir(dir: PathBuf, name: String, handler: CompiledHandler, now: SystemTime) -> Arc<Self> {
        Self::build(dir, name, handler, true, now)
    }

    fn build(
        dir: PathBuf,
        name: String,
        handler: CompiledHandler,
        is_dir: bool,
        now: SystemTime,
    ) -> Arc<Self> {
        let expire_at = handler.default_expire_at(now);
        let assembler = handler.new_assembler();
        Arc::new(Self {
            dir,
            name,
            handler,
            is_dir,
            offset: AtomicU64::new(0),
            begin_offset: AtomicU64::new(0),
            offset_change: AtomicU32::new(0),
            expire_at: SyncMutex::new(expire_at),
            assembler: SyncMutex::new(assembler),
            parse_lock: AsyncMutex::new(()),
            children: is_dir.then(|| SyncMutex::new(HashMap::new())),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn handler(&self) -> &CompiledHandler {
        &self.handler
    }

    pub fn offset(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    pub fn set_offset(&self, value: u64) {
        self.offset.store(value, Ordering::Release);
    }

    pub fn begin_offset(&self) -> u64 {
        self.begin_offset.load(Ordering::Acquire)
    }

    /// True once a parse has advanced this entry past its initial
    /// offset — used by the cron loop to find tail-enabled entries that
    /// have not yet seen a tail event.
    pub fn has_advanced(&self) -> bool {
        self.offset() != self.begin_offset()
    }

    /// Reset both offset markers to `value` (cleanOffset / loopParse
    /// truncation-restart).
    pub fn reset_offset(&self, value: u64) {
        self.offset.store(value, Ordering::Release);
        self.begin_offset.store(value, Ordering::Release);
    }

    pub fn set_begin_offset(&self, value: u64) {
        self.begin_offset.store(value, Ordering::Release);
    }

    pub fn expire_at(&self) -> SystemTime {
        *self.expire_at.lock()
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expire_at() < now
    }

    pub fn with_assembler<R>(&self, f: impl FnOnce(&mut LineAssembler) -> R) -> R {
        let mut guard = self.assembler.lock();
        f(&mut guard)
    }

    pub async fn lock_parse(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.parse_lock.lock().await
    }

    /// Mirrors the source's `saveOffset` counter policy: persist
    /// immediately when forced or when the policy is "every update";
    /// otherwise persist once the per-entry counter exceeds the
    /// configured threshold, resetting it.
    pub fn should_persist(&self, force: bool) -> bool {
        if force || matches!(self.handler.persist_policy(), PersistPolicy::Every) {
            return true;
        }
        let threshold = self.handler.persist_policy().threshold().unwrap_or(100) as u64;
        let count = self.offset_change.fetch_add(1, Ordering::AcqRel) as u64 + 1;
        if count > threshold {
            self.offset_change.store(0, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// For a directory entry: look up (or lazily create, subject to the
    /// handler's `needCollect` filter) the child entry for `filename`.
    /// Returns `None` for a non-directory entry or when the filter
    /// rejects the name. `init_offset` is invoked only when a new child is
    /// actually created, so callers can thread in a sidecar lookup without
    /// paying for it on the (common) cache-hit path.
    pub fn child_or_create(
        self: &Arc<Self>,
        filename: &str,
        now: SystemTime,
        init_offset: impl FnOnce() -> u64,
    ) -> Option<Arc<FileEntry>> {
        let children = self.children.as_ref()?;
        {
            let map = children.lock();
            if let Some(existing) = map.get(filename) {
                return Some(existing.clone());
            }
        }
        if !self.handler.need_collect(filename).unwrap_or(false) {
            return None;
        }
        let child = FileEntry::new_file(self.path(), filename.to_string(), self.handler.clone(), now);
        child.reset_offset(init_offset());
        let mut map = children.lock();
        Some(map.entry(filename.to_string()).or_insert(child).clone())
    }

    pub fn children_snapshot(&self) -> Vec<Arc<FileEntry>> {
        match &self.children {
            Some(children) => children.lock().values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Drop any cached handle pool entry for this path, recursing into
    /// children for directory entries.
    pub fn expire_close(&self, pool: &HandlePool) {
        pool.evict(&self.path());
        for child in self.children_snapshot() {
            child.expire_close(pool);
        }
    }
}

#[cfg(test)]
#[path = "file_entry_tests.rs"]
mod tests;
