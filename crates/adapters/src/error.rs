// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to construct filesystem watcher: {0}")]
    Init(#[source] notify::Error),
    #[error("failed to watch {path}: {source}")]
    Add {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("failed to unwatch {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("watcher is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("reading offset sidecar {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing offset sidecar {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("listing sidecar directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
