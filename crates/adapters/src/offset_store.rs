// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable offset checkpointing: a decimal-text sidecar per monitored
//! file, under `.pslog/offset/` next to it.
//!
//! All filesystem access goes through [`OffsetWriter`], so offset logic
//! can be unit-tested against a fake without touching disk.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::env;
use crate::error::OffsetError;

/// Abstracts the filesystem operations offset persistence needs.
pub trait OffsetWriter: Send + Sync + 'static {
    fn read_to_string(&self, path: &Path) -> Result<Option<String>, OffsetError>;
    fn write(&self, path: &Path, content: &str) -> Result<(), OffsetError>;
    fn remove(&self, path: &Path) -> Result<(), OffsetError>;
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, OffsetError>;
    fn modified(&self, path: &Path) -> Result<SystemTime, OffsetError>;
}

/// Production writer using real filesystem operations.
#[derive(Debug, Clone, Default)]
pub struct FsOffsetWriter;

impl OffsetWriter for FsOffsetWriter {
    fn read_to_string(&self, path: &Path) -> Result<Option<String>, OffsetError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(OffsetError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), OffsetError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| OffsetError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| OffsetError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn remove(&self, path: &Path) -> Result<(), OffsetError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(OffsetError::Write {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, OffsetError> {
        match std::fs::read_dir(dir) {
            Ok(entries) => Ok(entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(OffsetError::List {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime, OffsetError> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| OffsetError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Reads/writes the offset sidecar for a monitored file and garbage
/// collects stale sidecars under `.pslog/offset/`.
pub struct OffsetStore<W: OffsetWriter = FsOffsetWriter> {
    writer: W,
}

impl OffsetStore<FsOffsetWriter> {
    pub fn new() -> Self {
        Self {
            writer: FsOffsetWriter,
        }
    }
}

impl Default for OffsetStore<FsOffsetWriter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: OffsetWriter> OffsetStore<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    fn sidecar_dir(dir: &Path) -> PathBuf {
        dir.join(".pslog").join("offset")
    }

    fn sidecar_path(dir: &Path, filename: &str) -> PathBuf {
        Self::sidecar_dir(dir).join(format!("_{filename}.txt"))
    }

    /// Remove sidecars under `dir/.pslog/offset/` whose mtime is older
    /// than [`env::offset_sidecar_max_age`]. Best-effort: individual
    /// removal failures are logged, not propagated.
    pub fn gc(&self, dir: &Path, now: SystemTime) -> Result<(), OffsetError> {
        let sidecar_dir = Self::sidecar_dir(dir);
        let max_age = env::offset_sidecar_max_age();
        for entry in self.writer.list_dir(&sidecar_dir)? {
            let age = match self.writer.modified(&entry) {
                Ok(modified) => now.duration_since(modified).unwrap_or(Duration::ZERO),
                Err(err) => {
                    tracing::warn!(path = %entry.display(), error = %err, "failed to stat offset sidecar during gc");
                    continue;
                }
            };
            if age > max_age {
                if let Err(err) = self.writer.remove(&entry) {
                    tracing::warn!(path = %entry.display(), error = %err, "failed to remove stale offset sidecar");
                }
            }
        }
        Ok(())
    }

    /// Initialize an entry's offset: garbage-collect stale sidecars in
    /// `dir`, then either reset to 0 (when `clean_offset` is set) or read
    /// the persisted value (missing sidecar ⇒ 0).
    pub fn init_offset(
        &self,
        dir: &Path,
        filename: &str,
        clean_offset: bool,
        now: SystemTime,
    ) -> Result<u64, OffsetError> {
        if let Err(err) = self.gc(dir, now) {
            tracing::warn!(dir = %dir.display(), error = %err, "offset sidecar gc failed");
        }

        let path = Self::sidecar_path(dir, filename);
        if clean_offset {
            self.writer.write(&path, "0")?;
            return Ok(0);
        }
        let content = self.writer.read_to_string(&path)?;
        Ok(content
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }

    /// Write-through the current offset.
    pub fn save_offset(&self, dir: &Path, filename: &str, offset: u64) -> Result<(), OffsetError> {
        let path = Self::sidecar_path(dir, filename);
        self.writer.write(&path, &offset.to_string())
    }
}

#[cfg(test)]
#[path = "offset_store_tests.rs"]
mod tests;
