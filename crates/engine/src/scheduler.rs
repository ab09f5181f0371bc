// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic activity scheduler
//!
//! Fires a handler every `interval` and waits for the handler's future
//! before arming the next firing, so a slow batch is never overlapped by
//! its own trigger.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use ul_core::Clock;

/// When to fire next, given when the last firing started and finished
///
/// A firing that took longer than `interval + tolerance` pushes the next
/// one a full interval past its end; otherwise the cadence is kept, firing
/// right away when it already slipped.
pub fn next_firing(
    fired_at: Instant,
    finished_at: Instant,
    interval: Duration,
    tolerance: Duration,
) -> Instant {
    let took = finished_at.saturating_duration_since(fired_at);
    if took > interval + tolerance {
        finished_at + interval
    } else {
        (fired_at + interval).max(finished_at)
    }
}

pub struct ActivityScheduler<C> {
    clock: C,
    interval: Duration,
    tolerance: Duration,
    last_trigger: Arc<Mutex<Option<DateTime<Utc>>>>,
    stop: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock> ActivityScheduler<C> {
    pub fn new(clock: C, interval: Duration, tolerance: Duration) -> Self {
        Self {
            clock,
            interval,
            tolerance,
            last_trigger: Arc::new(Mutex::new(None)),
            stop: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Wall-clock time the handler last fired
    pub fn last_trigger_timestamp(&self) -> Option<DateTime<Utc>> {
        *self.last_trigger.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_started(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Start firing `handler`; returns false if already started or stopped
    pub fn start<H, Fut>(&self, handler: H) -> bool
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.is_some() || self.stop.is_cancelled() {
            return false;
        }

        let clock = self.clock.clone();
        let interval = self.interval;
        let tolerance = self.tolerance;
        let last_trigger = Arc::clone(&self.last_trigger);
        let stop = self.stop.clone();

        *task = Some(tokio::spawn(async move {
            let mut next = Instant::now() + interval;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep_until(next) => {}
                }

                let fired_at = Instant::now();
                *last_trigger.lock().unwrap_or_else(|e| e.into_inner()) = Some(clock.utc_now());
                tracing::info!("activity scheduler fired");

                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = handler() => {}
                }

                let finished_at = Instant::now();
                next = next_firing(fired_at, finished_at, interval, tolerance);
                tracing::debug!(
                    elapsed_ms = (finished_at - fired_at).as_millis() as u64,
                    "activity scheduler run completed"
                );
            }
            tracing::info!("activity scheduler stopped");
        }));
        tracing::info!(
            interval_secs = interval.as_secs(),
            tolerance_secs = tolerance.as_secs(),
            "activity scheduler started"
        );
        true
    }

    /// Stop firing; an in-progress handler future is dropped
    pub fn stop(&self) {
        self.stop.cancel();
    }
}

impl<C> Drop for ActivityScheduler<C> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
