// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue manager: run mode, preemption and batch aggregation
//!
//! The run mode is the only record of what is executing. Every transition
//! (accept, reject, preempt, drain) happens under the mode lock, and the
//! work queue is only touched while holding it, so racing requests resolve
//! to exactly one accepted mode.

use crate::builder::{build_collections, BatchContext};
use crate::deps::ExecutionDeps;
use crate::engagement::EngagementTracker;
use crate::mismatch;
use crate::recorder::BatchRecorder;
use crate::updater::DefinitionUpdater;
use crate::work_queue::BoundedWorkQueue;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use ul_adapters::{EventSink, JobRunnerFactory, NotifyAdapter, Repository, RunOptions};
use ul_core::{
    BatchError, BatchId, BatchIdGen, Clock, ErrorCollection, Event, QueueError, RunKind,
    RunPriority,
};

/// Receives a batch's outcome exactly once; `None` means nothing went wrong
pub type CompletionHandler = Box<dyn FnOnce(Option<ErrorCollection>) + Send + 'static>;

/// Result of asking for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accepted { batch_id: BatchId },
    /// A run that cannot be preempted is active; nothing was started
    Rejected,
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted { .. })
    }
}

struct ActiveRun {
    batch_id: BatchId,
    kind: RunKind,
    cancel: CancellationToken,
    recorder: BatchRecorder,
    on_complete: Option<CompletionHandler>,
}

enum RunMode {
    Idle,
    Immediate(ActiveRun),
    Scheduled(ActiveRun),
}

impl RunMode {
    fn active(&self) -> Option<(RunPriority, &ActiveRun)> {
        match self {
            RunMode::Idle => None,
            RunMode::Immediate(run) => Some((RunPriority::Immediate, run)),
            RunMode::Scheduled(run) => Some((RunPriority::Scheduled, run)),
        }
    }

    fn into_active(self) -> Option<ActiveRun> {
        match self {
            RunMode::Idle => None,
            RunMode::Immediate(run) | RunMode::Scheduled(run) => Some(run),
        }
    }

    fn is_current(&self, batch_id: &BatchId) -> bool {
        self.active().is_some_and(|(_, run)| &run.batch_id == batch_id)
    }
}

/// Snapshot of the active batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBatch {
    pub batch_id: BatchId,
    pub kind: RunKind,
    pub priority: RunPriority,
}

struct Inner<C, I> {
    mode: Mutex<RunMode>,
    queue: BoundedWorkQueue,
    reconciliations: TaskTracker,
    updater: Option<Arc<dyn DefinitionUpdater>>,
    engagement: EngagementTracker<C>,
    clock: C,
    id_gen: I,
}

/// Owns the run mode and the shared work queue
pub struct QueueManager<C, I> {
    inner: Arc<Inner<C, I>>,
}

impl<C, I> Clone for QueueManager<C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// One accepted batch on its way through the queue
struct Batch<R, F, E, N> {
    batch_id: BatchId,
    kind: RunKind,
    priority: RunPriority,
    ctx: BatchContext,
    deps: Arc<ExecutionDeps<R, F, E, N>>,
}

impl<C: Clock, I: BatchIdGen> QueueManager<C, I> {
    pub fn new(clock: C, id_gen: I, updater: Option<Arc<dyn DefinitionUpdater>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                mode: Mutex::new(RunMode::Idle),
                queue: BoundedWorkQueue::default(),
                reconciliations: TaskTracker::new(),
                updater,
                engagement: EngagementTracker::new(clock.clone()),
                clock,
                id_gen,
            }),
        }
    }

    fn lock_mode(&self) -> MutexGuard<'_, RunMode> {
        self.inner.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_running(&self) -> bool {
        !matches!(*self.lock_mode(), RunMode::Idle)
    }

    pub fn current(&self) -> Option<ActiveBatch> {
        self.lock_mode().active().map(|(priority, run)| ActiveBatch {
            batch_id: run.batch_id.clone(),
            kind: run.kind,
            priority,
        })
    }

    pub fn running_status_string(&self) -> &'static str {
        if self.is_running() {
            "running"
        } else {
            "idle"
        }
    }

    /// Ceiling currently applied to the work queue
    pub fn concurrency(&self) -> usize {
        self.inner.queue.max_concurrent()
    }

    /// Wait for match reconciliation spawned by finished batches
    pub async fn settle(&self) {
        let tracker = &self.inner.reconciliations;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    /// Request a batch of `kind` at `priority`
    ///
    /// Returns without waiting for the batch. A rejected request gets its
    /// handler called with `None` before this returns. An accepted request
    /// first interrupts any active run, whose handler receives
    /// `QueueError::Interrupted` before the new batch submits work.
    /// Must be called from within a tokio runtime.
    pub fn start_run<R, F, E, N>(
        &self,
        kind: RunKind,
        priority: RunPriority,
        options: RunOptions,
        deps: Arc<ExecutionDeps<R, F, E, N>>,
        on_complete: CompletionHandler,
    ) -> Admission
    where
        R: Repository,
        F: JobRunnerFactory,
        E: EventSink,
        N: NotifyAdapter,
    {
        let priority_date = match priority {
            RunPriority::Scheduled => Some(self.inner.clock.utc_now()),
            RunPriority::Immediate => None,
        };
        let ctx = BatchContext {
            kind,
            priority_date,
            options,
            recorder: BatchRecorder::new(),
            cancel: CancellationToken::new(),
        };

        let (batch_id, superseded) = {
            let mut mode = self.lock_mode();
            let active = mode.active().map(|(p, _)| p);
            if !priority.can_replace(active) {
                drop(mode);
                tracing::info!(
                    kind = %kind,
                    priority = %priority,
                    "run request rejected, active run cannot be interrupted"
                );
                on_complete(None);
                return Admission::Rejected;
            }

            let batch_id = self.inner.id_gen.next();
            let run = ActiveRun {
                batch_id: batch_id.clone(),
                kind,
                cancel: ctx.cancel.clone(),
                recorder: ctx.recorder.clone(),
                on_complete: Some(on_complete),
            };
            let next = match priority {
                RunPriority::Immediate => RunMode::Immediate(run),
                RunPriority::Scheduled => RunMode::Scheduled(run),
            };
            let superseded = std::mem::replace(&mut *mode, next).into_active();
            if let Some(old) = &superseded {
                old.cancel.cancel();
                self.inner.queue.cancel_all();
            }
            (batch_id, superseded)
        };

        if let Some(mut old) = superseded {
            tracing::info!(
                batch_id = %old.batch_id,
                by = %batch_id,
                "batch interrupted"
            );
            let errors = ErrorCollection {
                one_time_error: Some(QueueError::Interrupted.into()),
                operation_errors: old.recorder.take_errors(),
            };
            if let Some(handler) = old.on_complete.take() {
                handler(Some(errors));
            }
        }

        tracing::info!(batch_id = %batch_id, kind = %kind, priority = %priority, "batch accepted");
        let batch = Batch {
            batch_id: batch_id.clone(),
            kind,
            priority,
            ctx,
            deps,
        };
        let manager = self.clone();
        tokio::spawn(async move { manager.drive(batch).await });

        Admission::Accepted { batch_id }
    }

    /// Like [`start_run`](Self::start_run), delivering the outcome on a channel
    pub fn start_run_notified<R, F, E, N>(
        &self,
        kind: RunKind,
        priority: RunPriority,
        options: RunOptions,
        deps: Arc<ExecutionDeps<R, F, E, N>>,
    ) -> (Admission, oneshot::Receiver<Option<ErrorCollection>>)
    where
        R: Repository,
        F: JobRunnerFactory,
        E: EventSink,
        N: NotifyAdapter,
    {
        let (tx, rx) = oneshot::channel();
        let admission = self.start_run(
            kind,
            priority,
            options,
            deps,
            Box::new(move |errors| {
                let _ = tx.send(errors);
            }),
        );
        (admission, rx)
    }

    async fn drive<R, F, E, N>(self, batch: Batch<R, F, E, N>)
    where
        R: Repository,
        F: JobRunnerFactory,
        E: EventSink,
        N: NotifyAdapter,
    {
        let started = tokio::time::Instant::now();

        if !self.lock_mode().is_current(&batch.batch_id) {
            tracing::debug!(batch_id = %batch.batch_id, "batch superseded before start");
            return;
        }

        if let Some(updater) = &self.inner.updater {
            updater.check_for_updates().await;
        }

        let events = &batch.deps.events;
        events.fire(Event::BatchStarted {
            kind: batch.kind,
            priority: batch.priority,
        });
        self.inner.engagement.fire_due(events);

        let one_time_error = match build_collections(&batch.deps, &batch.ctx).await {
            Ok(collections) => {
                let drained = {
                    let mode = self.lock_mode();
                    if !mode.is_current(&batch.batch_id) {
                        tracing::debug!(batch_id = %batch.batch_id, "batch superseded before submit");
                        return;
                    }
                    let ceiling = batch.deps.config.concurrency_for(batch.kind);
                    self.inner.queue.set_max_concurrent(ceiling);
                    tracing::info!(
                        batch_id = %batch.batch_id,
                        collections = collections.len(),
                        ceiling,
                        "submitting broker collections"
                    );
                    for collection in collections {
                        self.inner.queue.add(Box::new(collection));
                    }
                    self.inner.queue.barrier()
                };
                drained.await;
                None
            }
            Err(e) => {
                tracing::warn!(batch_id = %batch.batch_id, error = %e, "batch aborted before any job started");
                Some(e)
            }
        };

        self.finish(batch, one_time_error, started.elapsed().as_millis() as u64);
    }

    fn finish<R, F, E, N>(
        &self,
        batch: Batch<R, F, E, N>,
        one_time_error: Option<BatchError>,
        elapsed_ms: u64,
    ) where
        R: Repository,
        F: JobRunnerFactory,
        E: EventSink,
        N: NotifyAdapter,
    {
        let handler = {
            let mut mode = self.lock_mode();
            if !mode.is_current(&batch.batch_id) {
                tracing::debug!(batch_id = %batch.batch_id, "superseded batch drained");
                return;
            }
            std::mem::replace(&mut *mode, RunMode::Idle)
                .into_active()
                .and_then(|mut run| run.on_complete.take())
        };

        let drained = one_time_error.is_none();
        let errors = ErrorCollection {
            one_time_error,
            operation_errors: batch.ctx.recorder.take_errors(),
        };
        tracing::info!(
            batch_id = %batch.batch_id,
            kind = %batch.kind,
            operation_errors = errors.operation_errors.len(),
            failed = errors.one_time_error.is_some(),
            elapsed_ms,
            "batch finished"
        );

        if batch.priority == RunPriority::Immediate && drained {
            let observed = batch.ctx.recorder.take_observed();
            let deps = Arc::clone(&batch.deps);
            self.inner.reconciliations.spawn(async move {
                mismatch::reconcile(&deps.repository, &deps.events, &observed).await;
            });
        }

        if let Some(handler) = handler {
            handler(errors.into_option());
        }
    }
}

#[cfg(test)]
#[path = "queue_manager_tests.rs"]
mod tests;
