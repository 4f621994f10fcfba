// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes shared across this crate's own tests and `pslog-engine`'s
//! integration tests. Gated behind the `test-support` feature.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::error::OffsetError;
use crate::offset_store::OffsetWriter;

/// An in-memory [`OffsetWriter`] for deterministic offset-store tests
/// without touching disk.
#[derive(Clone, Default)]
pub struct FakeOffsetWriter {
    files: Arc<Mutex<HashMap<PathBuf, (String, SystemTime)>>>,
    now: Arc<Mutex<SystemTime>>,
}

impl FakeOffsetWriter {
    pub fn new(now: SystemTime) -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set_now(&self, now: SystemTime) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = now;
    }
}

impl OffsetWriter for FakeOffsetWriter {
    fn read_to_string(&self, path: &Path) -> Result<Option<String>, OffsetError> {
        Ok(self
            .files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(path)
            .map(|(content, _)| content.clone()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), OffsetError> {
        let now = *self.now.lock().unwrap_or_else(|p| p.into_inner());
        self.files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(path.to_path_buf(), (content.to_string(), now));
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), OffsetError> {
        self.files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(path);
        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, OffsetError> {
        Ok(self
            .files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn modified(&self, path: &Path) -> Result<SystemTime, OffsetError> {
        self.files
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(path)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| OffsetError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}
