// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one built-in `Sink`: writes the assembled message to standard
//! output, unframed.

use async_trait::async_trait;
use pslog_core::{LogHandlerBus, Sink, SinkError};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    async fn deliver(&self, bus: &LogHandlerBus) -> Result<(), SinkError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(bus.message.as_bytes())
            .await
            .map_err(|err| SinkError::Delivery(err.to_string()))
    }
}

#[cfg(test)]
#[path = "stdout_sink_tests.rs"]
mod tests;
