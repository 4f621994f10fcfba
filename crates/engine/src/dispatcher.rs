// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads newly-appended bytes from a `FileEntry`, assembles them into
//! logical records, matches against the entry's targets, and hands
//! matched buckets to sinks.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use pslog_adapters::{FsOffsetWriter, HandlePool, OffsetStore, OffsetWriter};
use pslog_core::{LogHandlerBus, Sink};

use crate::error::EngineError;
use crate::file_entry::FileEntry;
use crate::worker_pool::WorkerPool;

struct Bucket {
    message: Vec<u8>,
    ext: String,
    target_ext: String,
    sinks: Vec<Arc<dyn Sink>>,
}

/// Implements the parse procedure against one `FileEntry` at a time.
/// Generic over the offset writer so tests can swap in an in-memory fake
/// (see `pslog_adapters::test_support::FakeOffsetWriter`).
pub struct Dispatcher<W: OffsetWriter = FsOffsetWriter> {
    pool: Arc<HandlePool>,
    offset_store: Arc<OffsetStore<W>>,
    worker_pool: Arc<WorkerPool>,
    _writer: PhantomData<W>,
}

impl<W: OffsetWriter> Dispatcher<W> {
    pub fn new(
        pool: Arc<HandlePool>,
        offset_store: Arc<OffsetStore<W>>,
        worker_pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            pool,
            offset_store,
            worker_pool,
            _writer: PhantomData,
        }
    }

    /// Exposed so the tail loop can initialize a lazily-created
    /// directory-child entry's offset from its sidecar.
    pub fn offset_store(&self) -> &Arc<OffsetStore<W>> {
        &self.offset_store
    }

    /// Parse `entry` from its current offset up to the file size
    /// observed at the start of this call. `must_save_offset` forces a
    /// write-through of the offset sidecar regardless of the handler's
    /// persist-counter policy. `async_dispatch` routes sink delivery
    /// through the worker pool instead of inline.
    pub async fn parse(
        &self,
        entry: &Arc<FileEntry>,
        must_save_offset: bool,
        async_dispatch: bool,
    ) -> Result<(), EngineError> {
        let _guard = entry.lock_parse().await;

        let path = entry.path();
        let handle = self.pool.acquire(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;

        let file_size = {
            let file = handle.file().lock();
            file.metadata()
                .map_err(|source| EngineError::Io {
                    path: path.clone(),
                    source,
                })?
                .len()
        };

        let mut offset = entry.offset();
        if file_size == 0 || offset == file_size {
            return Ok(());
        }
        if offset > file_size {
            if entry.handler().loop_parse() {
                offset = 0;
                entry.reset_offset(0);
            } else {
                return Ok(());
            }
        }

        let mut buckets: HashMap<usize, Bucket> = HashMap::new();
        {
            let mut file = handle.file().lock();
            file.seek(SeekFrom::Start(offset))
                .map_err(|source| EngineError::Io {
                    path: path.clone(),
                    source,
                })?;
            let mut reader = BufReader::new(&mut *file);
            let mut read_size = offset;
            loop {
                let mut line = Vec::new();
                let n = reader
                    .read_until(b'\n', &mut line)
                    .map_err(|source| EngineError::Io {
                        path: path.clone(),
                        source,
                    })?;
                if n == 0 {
                    break;
                }
                read_size += n as u64;
                if read_size > file_size {
                    break;
                }
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                if entry.with_assembler(|a| a.append(&line)) {
                    let record = entry.with_assembler(|a| a.line());
                    handle_line(entry, &record, &mut buckets);
                }
            }
        }

        let residue_empty = entry.with_assembler(|a| a.null());
        if !residue_empty {
            let record = entry.with_assembler(|a| a.line());
            handle_line(entry, &record, &mut buckets);
        }

        if !buckets.is_empty() {
            self.writer(entry, buckets, async_dispatch).await;
        }

        entry.set_offset(file_size);
        let persist = entry.should_persist(must_save_offset);
        if persist {
            let offset_store = self.offset_store.clone();
            let dir = entry.dir().to_path_buf();
            let name = entry.name().to_string();
            let submitted = self
                .worker_pool
                .submit(async move {
                    if let Err(err) = offset_store.save_offset(&dir, &name, file_size) {
                        tracing::warn!(dir = %dir.display(), name, error = %err, "failed to persist offset sidecar");
                    }
                })
                .await;
            if let Err(err) = submitted {
                tracing::warn!(path = %path.display(), error = %err, "failed to submit offset persistence to worker pool");
            }
        }

        Ok(())
    }

    async fn writer(&self, entry: &Arc<FileEntry>, buckets: HashMap<usize, Bucket>, async_dispatch: bool) {
        let log_path: PathBuf = entry.path();
        for (_, bucket) in buckets {
            let bus = Arc::new(LogHandlerBus {
                log_path: log_path.display().to_string(),
                message: String::from_utf8_lossy(&bucket.message).into_owned(),
                ext: bucket.ext,
                target_ext: bucket.target_ext,
            });
            for sink in bucket.sinks {
                if async_dispatch {
                    let bus = bus.clone();
                    let submitted = self
                        .worker_pool
                        .submit(async move {
                            if let Err(err) = sink.deliver(&bus).await {
                                tracing::warn!(error = %err, "sink delivery failed");
                            }
                        })
                        .await;
                    if let Err(err) = submitted {
                        tracing::warn!(path = %log_path.display(), error = %err, "failed to submit sink delivery to worker pool");
                    }
                } else if let Err(err) = sink.deliver(&bus).await {
                    tracing::warn!(error = %err, "sink delivery failed");
                }
            }
        }
    }
}

/// Classify one assembled logical record and append it to its target's
/// bucket. Drops lines with no matching target or whose matched target
/// excludes them.
fn handle_line(entry: &Arc<FileEntry>, line: &[u8], buckets: &mut HashMap<usize, Bucket>) {
    let targets = entry.handler().targets();
    if targets.is_null() {
        return;
    }
    let Some(pattern) = targets.get_target(line) else {
        return;
    };
    if pattern.excluded(line) {
        return;
    }
    let bucket = buckets.entry(pattern.no()).or_insert_with(|| Bucket {
        message: Vec::new(),
        ext: entry.handler().ext().to_string(),
        target_ext: pattern.ext().to_string(),
        sinks: pattern.sinks().to_vec(),
    });
    bucket.message.extend_from_slice(line);
    bucket.message.push(b'\n');
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
