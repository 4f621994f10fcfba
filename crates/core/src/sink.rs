// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The delivery contract a matched, assembled record is handed to.

use async_trait::async_trait;
use thiserror::Error;

/// The bundle handed to a [`Sink`] for one matched bucket.
#[derive(Debug, Clone)]
pub struct LogHandlerBus {
    /// The originally-registered path owning the file this record came
    /// from.
    pub log_path: String,
    /// The assembled, newline-joined message.
    pub message: String,
    /// The handler's opaque `ext` value.
    pub ext: String,
    /// The matched target's opaque `ext` value.
    pub target_ext: String,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink delivery failed: {0}")]
    Delivery(String),
}

/// A delivery target for matched, assembled records.
///
/// Implementors must be safe under concurrent invocation: the same
/// `Sink` instance may be invoked from the tail loop, a cron-triggered
/// parse, and worker-pool tasks at once.
#[async_trait]
pub trait Sink: Send + Sync + 'static {
    async fn deliver(&self, bus: &LogHandlerBus) -> Result<(), SinkError>;
}
