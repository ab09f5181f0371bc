// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent manager
//!
//! Maps lifecycle events (launch, profile saved, app launched, periodic
//! trigger, debug commands) onto queue manager runs and folds the outcomes
//! into telemetry and user notifications.

use crate::builder::unique_brokers;
use crate::deps::ExecutionDeps;
use crate::error::AgentError;
use crate::queue_manager::{Admission, CompletionHandler, QueueManager};
use crate::scheduler::ActivityScheduler;
use crate::updater::DefinitionUpdater;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use ul_adapters::{
    Entitlement, EventSink, JobRunnerFactory, NotifyAdapter, Repository, RunOptions,
};
use ul_core::{
    BatchError, BatchIdGen, Clock, ErrorCollection, Event, QueueError, RunKind, RunPriority,
};

/// How a run ended, from the requester's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Never started; a run that cannot be preempted was active
    Blocked,
    /// Preempted by a higher-priority run
    Interrupted { operation_errors: usize },
    /// Batch-level failure other than preemption
    Failed {
        error: BatchError,
        operation_errors: usize,
    },
    /// Drained; per-broker failures may still have happened
    Finished { operation_errors: usize },
}

impl RunOutcome {
    pub fn classify(admission: &Admission, errors: Option<&ErrorCollection>) -> Self {
        if !admission.is_accepted() {
            return RunOutcome::Blocked;
        }
        let Some(errors) = errors else {
            return RunOutcome::Finished {
                operation_errors: 0,
            };
        };
        let operation_errors = errors.operation_errors.len();
        match &errors.one_time_error {
            None => RunOutcome::Finished { operation_errors },
            Some(BatchError::Queue(QueueError::Interrupted)) => {
                RunOutcome::Interrupted { operation_errors }
            }
            Some(BatchError::Queue(QueueError::CannotInterrupt)) => RunOutcome::Blocked,
            Some(error) => RunOutcome::Failed {
                error: error.clone(),
                operation_errors,
            },
        }
    }

    pub fn operation_errors(&self) -> usize {
        match self {
            RunOutcome::Blocked => 0,
            RunOutcome::Interrupted { operation_errors }
            | RunOutcome::Failed {
                operation_errors, ..
            }
            | RunOutcome::Finished { operation_errors } => *operation_errors,
        }
    }
}

/// Debug status snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub is_running: bool,
    pub last_trigger_timestamp: Option<DateTime<Utc>>,
}

struct AgentInner<R, F, E, N, T, C, I> {
    queue: QueueManager<C, I>,
    deps: Arc<ExecutionDeps<R, F, E, N>>,
    entitlement: T,
    scheduler: ActivityScheduler<C>,
}

/// Top-level orchestrator; cheap to clone
pub struct AgentManager<R, F, E, N, T, C, I> {
    inner: Arc<AgentInner<R, F, E, N, T, C, I>>,
}

impl<R, F, E, N, T, C, I> Clone for AgentManager<R, F, E, N, T, C, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, F, E, N, T, C, I> AgentManager<R, F, E, N, T, C, I>
where
    R: Repository,
    F: JobRunnerFactory,
    E: EventSink,
    N: NotifyAdapter,
    T: Entitlement,
    C: Clock,
    I: BatchIdGen,
{
    pub fn new(
        deps: ExecutionDeps<R, F, E, N>,
        entitlement: T,
        clock: C,
        id_gen: I,
        updater: Option<Arc<dyn DefinitionUpdater>>,
    ) -> Self {
        let scheduler = ActivityScheduler::new(
            clock.clone(),
            deps.config.activity_scheduler_trigger_interval,
            deps.config.activity_scheduler_interval_tolerance,
        );
        Self {
            inner: Arc::new(AgentInner {
                queue: QueueManager::new(clock, id_gen, updater),
                deps: Arc::new(deps),
                entitlement,
                scheduler,
            }),
        }
    }

    pub fn queue(&self) -> &QueueManager<C, I> {
        &self.inner.queue
    }

    /// Scheduled runs opt out only for entitled users
    pub fn scheduled_kind(&self) -> RunKind {
        if self.inner.entitlement.is_entitled() {
            RunKind::All
        } else {
            RunKind::Scan
        }
    }

    /// Start a run and wait for its outcome
    pub async fn run_and_wait(
        &self,
        kind: RunKind,
        priority: RunPriority,
        options: RunOptions,
    ) -> Result<(Admission, Option<ErrorCollection>), AgentError> {
        let (admission, rx) = self.inner.queue.start_run_notified(
            kind,
            priority,
            options,
            Arc::clone(&self.inner.deps),
        );
        let errors = rx.await.map_err(|_| AgentError::CompletionDropped)?;
        Ok((admission, errors))
    }

    fn start_and_log(&self, kind: RunKind, priority: RunPriority, options: RunOptions) -> Admission {
        self.inner.queue.start_run(
            kind,
            priority,
            options,
            Arc::clone(&self.inner.deps),
            log_outcome(kind),
        )
    }

    async fn fire_monitoring(&self) {
        match self.inner.deps.repository.fetch_all_profile_queries().await {
            Ok(queries) => {
                let profile_queries = queries
                    .iter()
                    .map(|q| q.profile_query.id)
                    .collect::<HashSet<_>>()
                    .len();
                self.inner.deps.events.fire(Event::Monitoring {
                    profile_queries,
                    brokers: unique_brokers(&queries).len(),
                });
            }
            Err(e) => tracing::warn!(error = %e, "skipping monitoring telemetry"),
        }
    }

    fn start_periodic(&self) -> bool {
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.start(move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let agent = AgentManager { inner };
                if let Err(e) = agent.periodic_trigger().await {
                    tracing::warn!(error = %e, "periodic run did not report back");
                }
            }
        })
    }

    /// Agent process finished launching
    ///
    /// Returns whether anything was started; nothing is without a profile.
    pub async fn agent_finished_launching(&self) -> Result<bool, AgentError> {
        if !self.inner.deps.repository.has_profile().await? {
            tracing::info!("no profile saved, agent stays idle");
            return Ok(false);
        }
        self.start_periodic();
        self.fire_monitoring().await;
        self.start_and_log(self.scheduled_kind(), RunPriority::Scheduled, RunOptions::default());
        Ok(true)
    }

    /// The user saved a profile: scan everything now, then resume schedule
    pub async fn profile_saved(&self) -> Result<RunOutcome, AgentError> {
        let started = tokio::time::Instant::now();
        let deps = &self.inner.deps;

        if let Err(e) = deps.notify.request_permission().await {
            tracing::warn!(error = %e, "notification permission request failed");
        }
        self.fire_monitoring().await;

        let (admission, errors) = self
            .run_and_wait(RunKind::ManualScan, RunPriority::Immediate, RunOptions::default())
            .await?;
        let outcome = RunOutcome::classify(&admission, errors.as_ref());

        match &outcome {
            RunOutcome::Interrupted { .. } => {
                tracing::info!("initial scans interrupted");
                deps.events.fire(Event::ImmediateScansInterrupted);
            }
            RunOutcome::Failed { error, .. } => {
                tracing::error!(error = %error, "initial scans failed");
                deps.events.fire(Event::ImmediateScansFinishedWithError {
                    message: error.to_string(),
                });
            }
            RunOutcome::Finished { .. } | RunOutcome::Blocked => {}
        }
        if outcome.operation_errors() > 0 {
            tracing::info!(
                count = outcome.operation_errors(),
                "initial scans had operation errors"
            );
        }
        if let RunOutcome::Finished { .. } = outcome {
            deps.events.fire(Event::ImmediateScansFinishedWithoutError);
            if let Err(e) = deps.notify.first_scan_completed().await {
                tracing::warn!(error = %e, "first scan notification failed");
            }
        }

        match deps.repository.has_matches().await {
            Ok(true) => {
                if let Err(e) = deps.notify.schedule_check_in().await {
                    tracing::warn!(error = %e, "check-in notification failed");
                }
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "could not read recorded matches"),
        }

        match deps.repository.fetch_all_profile_queries().await {
            Ok(queries) => {
                let profile_queries = queries
                    .iter()
                    .map(|q| q.profile_query.id)
                    .collect::<HashSet<_>>()
                    .len();
                deps.events.fire(Event::InitialScanTotalDuration {
                    duration_ms: started.elapsed().as_millis() as u64,
                    profile_queries,
                });
            }
            Err(e) => tracing::warn!(error = %e, "could not count profile queries"),
        }

        self.start_and_log(self.scheduled_kind(), RunPriority::Scheduled, RunOptions::default());
        Ok(outcome)
    }

    /// The companion app launched
    pub async fn app_launched(&self) -> Result<RunOutcome, AgentError> {
        self.fire_monitoring().await;
        let (admission, errors) = self
            .run_and_wait(self.scheduled_kind(), RunPriority::Scheduled, RunOptions::default())
            .await?;
        let outcome = RunOutcome::classify(&admission, errors.as_ref());

        let events = &self.inner.deps.events;
        match &outcome {
            RunOutcome::Interrupted { .. } => {
                events.fire(Event::AppLaunchedScheduledRunInterrupted);
            }
            RunOutcome::Blocked => {
                tracing::info!("app launch run blocked by active run");
                events.fire(Event::AppLaunchedScheduledRunBlocked);
            }
            RunOutcome::Failed { error, .. } => {
                tracing::warn!(error = %error, "app launch run failed");
                events.fire(Event::AppLaunchedScheduledRunFinishedWithError {
                    message: error.to_string(),
                });
            }
            RunOutcome::Finished { .. } => {
                events.fire(Event::AppLaunchedScheduledRunFinishedWithoutError);
            }
        }
        if outcome.operation_errors() > 0 {
            tracing::info!(
                count = outcome.operation_errors(),
                "app launch run had operation errors"
            );
        }
        Ok(outcome)
    }

    /// Periodic trigger fired; resolves once the run reported back
    pub async fn periodic_trigger(&self) -> Result<RunOutcome, AgentError> {
        self.fire_monitoring().await;
        let (admission, errors) = self
            .run_and_wait(self.scheduled_kind(), RunPriority::Scheduled, RunOptions::default())
            .await?;
        Ok(RunOutcome::classify(&admission, errors.as_ref()))
    }

    pub fn start_immediate_operations(&self, show_ui: bool) -> Admission {
        self.start_and_log(
            RunKind::ManualScan,
            RunPriority::Immediate,
            RunOptions { show_ui },
        )
    }

    pub fn start_scheduled_operations(&self, show_ui: bool) -> Admission {
        self.start_and_log(
            self.scheduled_kind(),
            RunPriority::Scheduled,
            RunOptions { show_ui },
        )
    }

    pub fn run_all_opt_outs(&self, show_ui: bool) -> Admission {
        self.start_and_log(RunKind::OptOut, RunPriority::Immediate, RunOptions { show_ui })
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            is_running: self.inner.queue.is_running(),
            last_trigger_timestamp: self.inner.scheduler.last_trigger_timestamp(),
        }
    }

    pub fn running_status_string(&self) -> &'static str {
        self.inner.queue.running_status_string()
    }

    /// Wait for post-run work such as match reconciliation
    pub async fn settle(&self) {
        self.inner.queue.settle().await;
    }

    /// Stop the periodic trigger; active runs are left to finish
    pub fn shutdown(&self) {
        self.inner.scheduler.stop();
    }
}

fn log_outcome(kind: RunKind) -> CompletionHandler {
    Box::new(move |errors: Option<ErrorCollection>| match errors {
        None => tracing::info!(kind = %kind, "run finished cleanly"),
        Some(errors) => match &errors.one_time_error {
            Some(e) => tracing::warn!(
                kind = %kind,
                error = %e,
                operation_errors = errors.operation_errors.len(),
                "run ended early"
            ),
            None => tracing::info!(
                kind = %kind,
                operation_errors = errors.operation_errors.len(),
                "run finished with operation errors"
            ),
        },
    })
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
