// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] pslog_core::Error),
    #[error("{path} is a directory and its handler has no needCollect filter")]
    MissingNeedCollect { path: PathBuf },
    #[error("no default handler set; call Engine::register first or use add_path2handler")]
    NoDefaultHandler,
    #[error("{path} is already registered")]
    AlreadyRegistered { path: PathBuf },
    #[error("{path} is not registered")]
    NotRegistered { path: PathBuf },
    #[error("engine is closed")]
    Closed,
    #[error("watcher error: {0}")]
    Watch(#[from] pslog_adapters::WatchError),
    #[error("offset sidecar error: {0}")]
    Offset(#[from] pslog_adapters::OffsetError),
    #[error("io error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
