// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal bounded, LRU-evicted file-handle pool.
//!
//! The engine treats a handle pool as an external dependency (see
//! `DESIGN.md`); this is a self-contained stand-in implementing the same
//! contract: callers acquire a handle for the duration of one parse and
//! release it immediately after, rather than caching it on a `FileEntry`.
//! The pool itself may keep a handle warm across calls, up to `capacity`.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// A file handle on loan from a [`HandlePool`]. Dropping it returns the
/// handle to the pool rather than closing it; eviction happens lazily on
/// the next `acquire` that exceeds capacity.
pub struct PooledHandle {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl PooledHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &Mutex<File> {
        &self.file
    }
}

struct State {
    entries: HashMap<PathBuf, Arc<Mutex<File>>>,
    lru: VecDeque<PathBuf>,
}

pub struct HandlePool {
    capacity: usize,
    state: Mutex<State>,
}

impl HandlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(State {
                entries: HashMap::new(),
                lru: VecDeque::new(),
            }),
        }
    }

    /// Acquire a read-only handle for `path`, opening it if not already
    /// cached. Evicts the least-recently-used entry when this insertion
    /// would exceed capacity.
    pub fn acquire(&self, path: &Path) -> std::io::Result<PooledHandle> {
        let mut state = self.state.lock();

        if let Some(file) = state.entries.get(path).cloned() {
            touch(&mut state.lru, path);
            return Ok(PooledHandle {
                path: path.to_path_buf(),
                file,
            });
        }

        let file = Arc::new(Mutex::new(File::open(path)?));
        if state.entries.len() >= self.capacity {
            if let Some(evicted) = state.lru.pop_front() {
                state.entries.remove(&evicted);
            }
        }
        state.entries.insert(path.to_path_buf(), file.clone());
        state.lru.push_back(path.to_path_buf());

        Ok(PooledHandle {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Drop any cached handle for `path`, e.g. on entry expiry.
    pub fn evict(&self, path: &Path) {
        let mut state = self.state.lock();
        state.entries.remove(path);
        state.lru.retain(|p| p != path);
    }

    /// True if a handle for `path` is currently cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.state.lock().entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn touch(lru: &mut VecDeque<PathBuf>, path: &Path) {
    if let Some(pos) = lru.iter().position(|p| p == path) {
        if let Some(entry) = lru.remove(pos) {
            lru.push_back(entry);
        }
    }
}

#[cfg(test)]
#[path = "handle_pool_tests.rs"]
mod tests;
