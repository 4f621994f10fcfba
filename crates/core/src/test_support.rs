// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes shared across this crate's own tests and `pslog-adapters`'/
//! `pslog-engine`'s integration tests. Gated behind the `test-support`
//! feature so release builds of dependents never pull this in.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::sink::{LogHandlerBus, Sink, SinkError};

/// A [`Sink`] that records every delivered bus instead of writing
/// anywhere, for assertions in tests.
#[derive(Clone, Default)]
pub struct FakeSink {
    delivered: Arc<Mutex<Vec<LogHandlerBus>>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far, in delivery order.
    pub fn delivered(&self) -> Vec<LogHandlerBus> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Sink for FakeSink {
    async fn deliver(&self, bus: &LogHandlerBus) -> Result<(), SinkError> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(bus.clone());
        Ok(())
    }
}

/// A [`Sink`] whose `deliver` always fails, for error-path tests.
pub struct FailingSink;

#[async_trait]
impl Sink for FailingSink {
    async fn deliver(&self, _bus: &LogHandlerBus) -> Result<(), SinkError> {
        Err(SinkError::Delivery("fake sink always fails".into()))
    }
}
