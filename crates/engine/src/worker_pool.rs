// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded async worker pool for sink dispatch and offset persistence.
//!
//! Capacity is enforced with a [`tokio::sync::Semaphore`]: `submit`
//! blocks (cooperatively, never drops) when the pool is full, exerting
//! backpressure on the caller. Each task is bounded by a max lifetime;
//! a runaway sink cannot pin a worker slot forever. `drain` awaits every
//! outstanding task, used by `Engine::close` for graceful shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

/// Errors submitting work to a [`WorkerPool`].
#[derive(Debug, Error)]
pub enum WorkerPoolError {
    #[error("worker pool is closed")]
    Closed,
}

pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    worker_lifetime: Duration,
}

impl WorkerPool {
    pub fn new(capacity: usize, worker_lifetime: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            worker_lifetime,
        }
    }

    /// Submit a future for background execution. Blocks until a slot is
    /// free rather than dropping work. Errors only if the pool's
    /// semaphore has been closed, which this type never does itself.
    pub async fn submit<F>(&self, fut: F) -> Result<(), WorkerPoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| WorkerPoolError::Closed)?;
        let lifetime = self.worker_lifetime;
        let mut tasks = self.tasks.lock().await;
        tasks.spawn(async move {
            let _permit = permit;
            if tokio::time::timeout(lifetime, fut).await.is_err() {
                tracing::warn!(?lifetime, "worker pool task exceeded its max lifetime");
            }
        });
        Ok(())
    }

    /// Await every outstanding task. Called during graceful close.
    pub async fn drain(&self) {
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
    }

    pub async fn active_count(&self) -> usize {
        self.tasks.lock().await.len()
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
