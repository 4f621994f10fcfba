// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public orchestration surface: registers paths, runs the tail loop
//! against the watcher's event channel, exposes a host-driven cron sweep,
//! and periodically expires stale entries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use pslog_adapters::{FsOffsetWriter, HandlePool, OffsetStore, OffsetWriter, Watcher};
use pslog_core::CompiledHandler;
use tokio::task::JoinHandle;

use crate::dispatcher::Dispatcher;
use crate::error::EngineError;
use crate::file_entry::FileEntry;
use crate::options::EngineOptions;
use crate::worker_pool::WorkerPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EngineState {
    Fresh,
    Registered,
    Active,
    Tailing,
}

enum RegisterMode {
    SkipExisting,
    Replace,
}

type EntryMap = Arc<RwLock<HashMap<PathBuf, Arc<FileEntry>>>>;

/// Embedded log-tailing and pattern-dispatch engine.
///
/// Generic over the offset writer so hosts needing a fake (tests) or an
/// alternate backing store can supply one; defaults to the real
/// filesystem-backed [`FsOffsetWriter`].
pub struct Engine<W: OffsetWriter = FsOffsetWriter> {
    options: EngineOptions,
    state: Mutex<EngineState>,
    default_handler: Mutex<Option<CompiledHandler>>,
    entries: EntryMap,
    watcher: Mutex<Option<Watcher>>,
    handle_pool: Arc<HandlePool>,
    offset_store: Arc<OffsetStore<W>>,
    worker_pool: Arc<WorkerPool>,
    dispatcher: Arc<Dispatcher<W>>,
    tail_started: AtomicBool,
    tail_task: Mutex<Option<JoinHandle<()>>>,
    sweep_task: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<AtomicBool>,
}

impl Engine<FsOffsetWriter> {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_offset_writer(options, FsOffsetWriter)
    }
}

impl<W: OffsetWriter> Engine<W> {
    pub fn with_offset_writer(options: EngineOptions, writer: W) -> Self {
        let handle_pool = Arc::new(HandlePool::new(
            pslog_adapters::default_handle_pool_capacity(),
        ));
        let offset_store = Arc::new(OffsetStore::with_writer(writer));
        let worker_pool = Arc::new(WorkerPool::new(
            options.task_pool_capacity(),
            options.worker_lifetime(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            handle_pool.clone(),
            offset_store.clone(),
            worker_pool.clone(),
        ));
        let entries: EntryMap = Arc::new(RwLock::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let sweep_period = options.clean_up_period();
        let sweep_entries = entries.clone();
        let sweep_handle_pool = handle_pool.clone();
        let sweep_closed = closed.clone();
        let sweep_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if sweep_closed.load(Ordering::Acquire) {
                    break;
                }
                sweep_expired(&sweep_entries, &sweep_handle_pool);
            }
        });

        Self {
            options,
            state: Mutex::new(EngineState::Fresh),
            default_handler: Mutex::new(None),
            entries,
            watcher: Mutex::new(None),
            handle_pool,
            offset_store,
            worker_pool,
            dispatcher,
            tail_started: AtomicBool::new(false),
            tail_task: Mutex::new(None),
            sweep_task: Mutex::new(Some(sweep_task)),
            closed,
        }
    }

    /// Sets the handler applied by subsequent calls to [`Self::add_paths`]
    /// that don't supply their own. Idempotent to call more than once;
    /// the latest registration wins.
    pub fn register(&self, handler: CompiledHandler) -> Result<(), EngineError> {
        self.ensure_not_closed()?;
        *self.default_handler.lock() = Some(handler);
        self.advance_state(EngineState::Registered);
        Ok(())
    }

    /// Register `paths` against the handler set by [`Self::register`].
    /// Paths already registered are silently skipped.
    pub fn add_paths(&self, paths: &[PathBuf]) -> Result<(), EngineError> {
        let handler = self
            .default_handler
            .lock()
            .clone()
            .ok_or(EngineError::NoDefaultHandler)?;
        for path in paths {
            self.register_path(path.clone(), handler.clone(), RegisterMode::SkipExisting)?;
        }
        Ok(())
    }

    /// Register a single path against an explicit handler. Skipped
    /// silently if already registered.
    pub fn add_path2handler(&self, path: PathBuf, handler: CompiledHandler) -> Result<(), EngineError> {
        self.register_path(path, handler, RegisterMode::SkipExisting)
    }

    /// Like [`Self::add_path2handler`] but overwrites an existing
    /// registration instead of skipping it.
    pub fn replace_path2handler(&self, path: PathBuf, handler: CompiledHandler) -> Result<(), EngineError> {
        self.register_path(path, handler, RegisterMode::Replace)
    }

    /// Register every entry of `map`, one handler per path. Paths already
    /// registered are silently skipped.
    pub fn add_path2handler_map(&self, map: HashMap<PathBuf, CompiledHandler>) -> Result<(), EngineError> {
        for (path, handler) in map {
            self.register_path(path, handler, RegisterMode::SkipExisting)?;
        }
        Ok(())
    }

    fn register_path(
        &self,
        path: PathBuf,
        handler: CompiledHandler,
        mode: RegisterMode,
    ) -> Result<(), EngineError> {
        self.ensure_not_closed()?;
        let is_dir = path.is_dir();
        if is_dir && !handler.has_need_collect() {
            return Err(EngineError::MissingNeedCollect { path });
        }

        if matches!(mode, RegisterMode::SkipExisting) && self.entries.read().contains_key(&path) {
            return Ok(());
        }

        let now = SystemTime::now();
        let (dir, name) = split_path(&path, is_dir);

        let entry = if is_dir {
            let entry = FileEntry::new_dir(dir, name, handler.clone(), now);
            self.seed_directory_children(&entry, now);
            entry
        } else {
            let offset = self
                .offset_store
                .init_offset(&dir, &name, handler.clean_offset(), now)?;
            let entry = FileEntry::new_file(dir, name, handler.clone(), now);
            entry.reset_offset(offset);
            entry
        };

        if self.is_tailing() && handler.tail() {
            if let Some(watcher) = self.watcher.lock().as_ref() {
                watcher.add(&path)?;
            }
        }

        self.entries.write().insert(path, entry);
        self.advance_state(EngineState::Active);
        Ok(())
    }

    /// Initial directory scan (spec "on initial scan, needCollect filters
    /// which files to instantiate as children"): seeds a freshly
    /// registered directory's children up front, so a host driving it
    /// purely via [`Self::cron_logs`] (no tail loop) still discovers the
    /// files already present at registration time. Read errors are
    /// logged and otherwise non-fatal; the directory registration itself
    /// still succeeds.
    fn seed_directory_children(&self, entry: &Arc<FileEntry>, now: SystemTime) {
        let dir = entry.dir().to_path_buf();
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "failed to scan directory for initial child collection");
                return;
            }
        };
        for item in read_dir.filter_map(Result::ok) {
            let Ok(filename) = item.file_name().into_string() else {
                continue;
            };
            let Ok(file_type) = item.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            let offset_store = self.offset_store.clone();
            let clean_offset = entry.handler().clean_offset();
            let init_dir = dir.clone();
            let init_name = filename.clone();
            entry.child_or_create(&filename, now, || {
                offset_store
                    .init_offset(&init_dir, &init_name, clean_offset, now)
                    .unwrap_or(0)
            });
        }
    }

    /// Start the tail loop: subscribes the watcher to every currently
    /// registered tail-enabled path, then spawns a task that parses each
    /// entry as watch events arrive. Idempotent: a second call is a no-op.
    pub fn tail_logs(&self, chan_size: Option<usize>) -> Result<(), EngineError> {
        self.ensure_not_closed()?;
        if self.tail_started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let capacity = chan_size.unwrap_or_else(pslog_adapters::watch_channel_capacity);
        let (watcher, mut rx) = Watcher::new(capacity)?;
        {
            let entries = self.entries.read();
            for entry in entries.values() {
                if entry.handler().tail() {
                    watcher.add(entry.path())?;
                }
            }
        }
        *self.watcher.lock() = Some(watcher);
        self.advance_state(EngineState::Tailing);

        let entries = self.entries.clone();
        let dispatcher = self.dispatcher.clone();
        let async2tos = self.options.is_async2tos();
        let closed = self.closed.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                let entry = entries.read().get(&event.path).cloned();
                let Some(entry) = entry else {
                    tracing::debug!(path = %event.path.display(), "watch event for an unregistered path");
                    continue;
                };
                let target = if entry.is_dir() {
                    let Some(filename) = event
                        .changed_filename
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                    else {
                        continue;
                    };
                    let offset_store = dispatcher.offset_store().clone();
                    let dir = entry.dir().to_path_buf();
                    let init_name = filename.clone();
                    match entry.child_or_create(&filename, SystemTime::now(), || {
                        offset_store
                            .init_offset(&dir, &init_name, false, SystemTime::now())
                            .unwrap_or(0)
                    }) {
                        Some(child) => child,
                        None => continue,
                    }
                } else {
                    entry.clone()
                };
                if !target.handler().tail() {
                    continue;
                }
                if let Err(err) = dispatcher.parse(&target, false, async2tos).await {
                    tracing::warn!(path = %target.path().display(), error = %err, "tail parse failed");
                }
            }
        });
        *self.tail_task.lock() = Some(handle);
        Ok(())
    }

    /// Host-driven cron sweep: parses every entry that the tail loop has
    /// not yet advanced, plus every entry whose handler has `tail=false`.
    /// `make_up_tail` is accepted for API parity with the option table but
    /// is always treated as `true` (see `DESIGN.md`).
    pub async fn cron_logs(&self, _make_up_tail: Option<bool>) -> Result<(), EngineError> {
        self.ensure_not_closed()?;
        let snapshot: Vec<Arc<FileEntry>> = self
            .entries
            .read()
            .values()
            .flat_map(cron_candidates)
            .collect();
        let async2tos = self.options.is_async2tos();
        for entry in snapshot {
            if !entry.has_advanced() || !entry.handler().tail() {
                if let Err(err) = self.dispatcher.parse(&entry, true, async2tos).await {
                    tracing::warn!(path = %entry.path().display(), error = %err, "cron parse failed");
                }
            }
        }
        Ok(())
    }

    /// Human-readable diagnostic table, one row per registered path. Not
    /// a stable wire format.
    pub fn list(&self, print_targets: bool) -> String {
        let entries = self.entries.read();
        let mut out = String::from("PATH\tOPEN\tEXPIRE\tTAIL\tBEGIN\tOFFSET\n");
        for entry in entries.values() {
            self.list_entry(entry, print_targets, &mut out);
            for child in entry.children_snapshot() {
                self.list_entry(&child, print_targets, &mut out);
            }
        }
        out
    }

    fn list_entry(&self, entry: &Arc<FileEntry>, print_targets: bool, out: &mut String) {
        let open = self.handle_pool.contains(&entry.path());
        let tail = if entry.handler().tail() && !entry.has_advanced() {
            "true (may cron)".to_string()
        } else {
            entry.handler().tail().to_string()
        };
        out.push_str(&format!(
            "{}\t{}\t{:?}\t{}\t{}\t{}\n",
            entry.path().display(),
            open,
            entry.expire_at(),
            tail,
            entry.begin_offset(),
            entry.offset(),
        ));
        if print_targets {
            for target in entry.handler().target_list() {
                out.push_str(&format!(
                    "    target[{}] content={:?} excludes={:?}\n",
                    target.no(),
                    String::from_utf8_lossy(target.content()),
                    target.excludes_display(),
                ));
            }
        }
    }

    /// Idempotent graceful shutdown: stops the watcher (ending the tail
    /// loop), drains the worker pool, then ends the expiry sweep.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(watcher) = self.watcher.lock().take() {
            watcher.close();
        }
        if let Some(handle) = self.tail_task.lock().take() {
            let _ = handle.await;
        }
        self.worker_pool.drain().await;
        if let Some(handle) = self.sweep_task.lock().take() {
            handle.abort();
        }
    }

    fn is_tailing(&self) -> bool {
        *self.state.lock() == EngineState::Tailing
    }

    fn advance_state(&self, to: EngineState) {
        let mut state = self.state.lock();
        if *state < to {
            *state = to;
        }
    }

    fn ensure_not_closed(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::Acquire) {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Directory entries are never parsed directly; cron sweeps their
/// already-instantiated children instead (mirroring how
/// `FileEntry::expire_close` recurses into `children_snapshot`).
fn cron_candidates(entry: &Arc<FileEntry>) -> Vec<Arc<FileEntry>> {
    if entry.is_dir() {
        entry.children_snapshot()
    } else {
        vec![entry.clone()]
    }
}

fn split_path(path: &Path, is_dir: bool) -> (PathBuf, String) {
    if is_dir {
        (path.to_path_buf(), String::new())
    } else {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (dir, name)
    }
}

fn sweep_expired(entries: &EntryMap, handle_pool: &HandlePool) {
    let now = SystemTime::now();
    let expired: Vec<PathBuf> = entries
        .read()
        .iter()
        .filter(|(_, entry)| entry.is_expired(now))
        .map(|(path, _)| path.clone())
        .collect();
    if expired.is_empty() {
        return;
    }
    let mut map = entries.write();
    for path in expired {
        if let Some(entry) = map.remove(&path) {
            entry.expire_close(handle_pool);
            tracing::debug!(path = %path.display(), "expired entry removed from registry");
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
