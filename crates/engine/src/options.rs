// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent [`EngineOptions`] builder, mirroring [`crate::HandlerBuilder`]'s
//! shape at the engine level.

use std::time::Duration;

const DEFAULT_WORKER_LIFETIME: Duration = Duration::from_secs(21_600);
const DEFAULT_CLEAN_UP_TIME: Duration = Duration::from_secs(3_600);

/// Engine-wide configuration. Construct with [`EngineOptions::new`] and
/// the fluent setters, then pass to [`crate::Engine::new`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    async2tos: bool,
    task_pool_size: usize,
    worker_lifetime: Duration,
    clean_up_time: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            async2tos: false,
            task_pool_size: num_cpus(),
            worker_lifetime: DEFAULT_WORKER_LIFETIME,
            clean_up_time: DEFAULT_CLEAN_UP_TIME,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke sinks (and offset persistence) via the worker pool rather
    /// than inline on the tail/cron caller's task.
    pub fn async2tos(mut self, async2tos: bool) -> Self {
        self.async2tos = async2tos;
        self
    }

    /// Worker pool capacity, and optionally the per-task max lifetime in
    /// seconds (default 21600, i.e. 6 hours).
    pub fn task_pool_size(mut self, n: usize, worker_lifetime_secs: Option<u64>) -> Self {
        self.task_pool_size = n.max(1);
        if let Some(secs) = worker_lifetime_secs {
            self.worker_lifetime = Duration::from_secs(secs);
        }
        self
    }

    /// Period of the expiry sweep.
    pub fn clean_up_time(mut self, period: Duration) -> Self {
        self.clean_up_time = period;
        self
    }

    pub fn is_async2tos(&self) -> bool {
        self.async2tos
    }

    pub fn task_pool_capacity(&self) -> usize {
        self.task_pool_size
    }

    pub fn worker_lifetime(&self) -> Duration {
        self.worker_lifetime
    }

    pub fn clean_up_period(&self) -> Duration {
        self.clean_up_time
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
