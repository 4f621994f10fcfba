// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory/file watcher: wraps `notify` and turns raw filesystem events
//! into [`WatchEvent`]s addressed to whichever registration owns them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::WatchError;

/// One filesystem change forwarded to the engine's tail loop.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// The originally-registered path that owns this event.
    pub path: PathBuf,
    /// Whether `path` was registered as a directory.
    pub is_dir: bool,
    /// The specific file that changed.
    pub changed_filename: PathBuf,
    pub is_rename: bool,
}

#[derive(Clone)]
struct Registration {
    path: PathBuf,
    is_dir: bool,
}

type Registrations = Arc<Mutex<HashMap<PathBuf, Registration>>>;

/// Subscribes to filesystem events on registered files/directories and
/// delivers [`WatchEvent`]s on a bounded channel. Producers never drop on
/// overflow: the underlying `notify` callback blocks via
/// [`mpsc::Sender::blocking_send`], applying backpressure to the
/// notifier's own thread.
pub struct Watcher {
    registrations: Registrations,
    watcher: Mutex<Option<RecommendedWatcher>>,
    closed: Arc<AtomicBool>,
}

impl Watcher {
    /// Construct a watcher and its output channel, bounded to `capacity`.
    pub fn new(capacity: usize) -> Result<(Self, mpsc::Receiver<WatchEvent>), WatchError> {
        let (tx, rx) = mpsc::channel(capacity);
        let registrations: Registrations = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let cb_registrations = registrations.clone();
        let cb_closed = closed.clone();
        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if cb_closed.load(Ordering::Acquire) {
                return;
            }
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "filesystem watcher reported an error");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            let is_rename = matches!(
                event.kind,
                EventKind::Modify(notify::event::ModifyKind::Name(_))
            );
            for changed in event.paths {
                let Some(found) = lookup(&cb_registrations, &changed) else {
                    continue;
                };
                let watch_event = WatchEvent {
                    path: found.path,
                    is_dir: found.is_dir,
                    changed_filename: changed,
                    is_rename,
                };
                tracing::debug!(path = %watch_event.changed_filename.display(), "forwarding watch event");
                if tx.blocking_send(watch_event).is_err() {
                    break;
                }
            }
        })
        .map_err(WatchError::Init)?;

        Ok((
            Self {
                registrations,
                watcher: Mutex::new(Some(watcher)),
                closed,
            },
            rx,
        ))
    }

    /// Watch `path` (file or directory). Directories are registered
    /// non-recursively: rename/recreate rotations of a monitored file are
    /// caught by watching its parent directory instead of the file
    /// itself.
    pub fn add(&self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(WatchError::Closed);
        }
        let path = path.as_ref().to_path_buf();
        let is_dir = path.is_dir();
        let subscribe_target = if is_dir {
            path.clone()
        } else {
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| path.clone())
        };

        let mut guard = self.watcher.lock();
        let Some(watcher) = guard.as_mut() else {
            return Err(WatchError::Closed);
        };
        watcher
            .watch(&subscribe_target, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Add {
                path: subscribe_target,
                source,
            })?;
        self.registrations
            .lock()
            .insert(path.clone(), Registration { path, is_dir });
        Ok(())
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Result<(), WatchError> {
        let path = path.as_ref().to_path_buf();
        let Some(reg) = self.registrations.lock().remove(&path) else {
            return Ok(());
        };
        let subscribed = if reg.is_dir {
            reg.path
        } else {
            reg.path.parent().map(Path::to_path_buf).unwrap_or(reg.path)
        };
        let mut guard = self.watcher.lock();
        let Some(watcher) = guard.as_mut() else {
            return Ok(());
        };
        watcher
            .unwatch(&subscribed)
            .map_err(|source| WatchError::Remove {
                path: subscribed,
                source,
            })
    }

    /// Idempotent: subsequent calls are no-ops. Drops the underlying
    /// `notify` watcher, which ends its internal thread and drops the
    /// callback's `Sender`, closing the output channel exactly once.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.watcher.lock().take();
    }
}

/// Two-probe lookup: try the exact changed path, then its parent
/// directory (covers directory-registered watches).
fn lookup(registrations: &Registrations, changed: &Path) -> Option<Registration> {
    let map = registrations.lock();
    if let Some(found) = map.get(changed) {
        return Some(found.clone());
    }
    let parent = changed.parent()?;
    map.get(parent).cloned()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
