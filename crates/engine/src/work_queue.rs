// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded work queue
//!
//! Runs queued jobs on the tokio runtime with at most `max_concurrent`
//! executing at once. Jobs are grouped into generations: `cancel_all`
//! cancels every job of the current generation, and `barrier` seals the
//! jobs added so far and returns a future that resolves once they settle.

use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A unit of work the queue can run
#[async_trait]
pub trait QueuedJob: Send + 'static {
    /// Run to completion. `cancel` fires when the queue cancels all work;
    /// jobs check it between steps.
    async fn run(self: Box<Self>, cancel: CancellationToken);
}

struct QueueState {
    max_concurrent: usize,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

/// Shared, cloneable handle to the queue
#[derive(Clone)]
pub struct BoundedWorkQueue {
    state: Arc<Mutex<QueueState>>,
}

impl BoundedWorkQueue {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            state: Arc::new(Mutex::new(QueueState {
                max_concurrent,
                permits: Arc::new(Semaphore::new(max_concurrent)),
                cancel: CancellationToken::new(),
                tracker: TaskTracker::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn max_concurrent(&self) -> usize {
        self.lock().max_concurrent
    }

    /// Change the ceiling for jobs added from now on
    pub fn set_max_concurrent(&self, max_concurrent: usize) {
        let max_concurrent = max_concurrent.max(1);
        let mut state = self.lock();
        if state.max_concurrent != max_concurrent {
            state.max_concurrent = max_concurrent;
            state.permits = Arc::new(Semaphore::new(max_concurrent));
        }
    }

    /// Queue a job. It starts once a slot is free, unless cancelled first.
    pub fn add(&self, job: Box<dyn QueuedJob>) {
        let state = self.lock();
        let permits = Arc::clone(&state.permits);
        let cancel = state.cancel.clone();
        state.tracker.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };
            job.run(cancel).await;
            drop(permit);
        });
    }

    /// Cancel every job of the current generation
    pub fn cancel_all(&self) {
        let mut state = self.lock();
        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        tracing::debug!("work queue cancelled");
    }

    /// Resolves once every job added before this call has finished or
    /// been cancelled. Later jobs are not waited on.
    pub fn barrier(&self) -> impl Future<Output = ()> + Send + 'static {
        let sealed = {
            let mut state = self.lock();
            std::mem::replace(&mut state.tracker, TaskTracker::new())
        };
        sealed.close();
        async move { sealed.wait().await }
    }
}

impl Default for BoundedWorkQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
#[path = "work_queue_tests.rs"]
mod tests;
