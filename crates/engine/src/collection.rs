// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-broker job collection
//!
//! One collection owns every scan and opt-out step of one broker within a
//! batch. Steps run strictly one after another with a fixed pause between
//! them; a failing step is recorded and the next one still runs.

use crate::recorder::BatchRecorder;
use crate::work_queue::QueuedJob;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use ul_adapters::{EventSink, JobRunner, Repository};
use ul_core::{
    due_jobs, BrokerId, BrokerProfileQuery, MatchCount, OperationError, ProfileQueryId, RunKind,
    RunnerError, ScheduledJob, StepKind,
};

/// Timing applied to every step of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTiming {
    pub interval: Duration,
    pub scan_timeout: Duration,
    pub opt_out_timeout: Duration,
}

pub struct BrokerJobCollection<R, J, E> {
    broker_id: BrokerId,
    broker_name: String,
    kind: RunKind,
    priority_date: Option<DateTime<Utc>>,
    timing: StepTiming,
    repository: R,
    runner: J,
    events: E,
    recorder: BatchRecorder,
    batch_cancel: CancellationToken,
}

impl<R, J, E> BrokerJobCollection<R, J, E>
where
    R: Repository,
    J: JobRunner,
    E: EventSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        broker_id: BrokerId,
        broker_name: impl Into<String>,
        kind: RunKind,
        priority_date: Option<DateTime<Utc>>,
        timing: StepTiming,
        repository: R,
        runner: J,
        events: E,
        recorder: BatchRecorder,
        batch_cancel: CancellationToken,
    ) -> Self {
        Self {
            broker_id,
            broker_name: broker_name.into(),
            kind,
            priority_date,
            timing,
            repository,
            runner,
            events,
            recorder,
            batch_cancel,
        }
    }

    pub fn broker_id(&self) -> BrokerId {
        self.broker_id
    }

    fn fail(&self, step: StepKind, profile_query_id: Option<ProfileQueryId>, source: RunnerError) {
        let error = OperationError {
            broker: self.broker_name.clone(),
            broker_id: self.broker_id,
            profile_query_id,
            step,
            source,
        };
        tracing::warn!(broker = %self.broker_name, error = %error, "broker step failed");
        self.recorder.record_error(error, &self.events);
    }

    /// Due steps in execution order: scans first, then opt-outs
    fn plan(&self, queries: &[BrokerProfileQuery]) -> Vec<ScheduledJob> {
        let mut jobs = Vec::new();
        if self.kind.runs_scans() {
            let scans = queries.iter().map(|q| ScheduledJob::Scan(q.scan_job.clone()));
            jobs.extend(due_jobs(scans, self.priority_date));
        }
        if self.kind.runs_opt_outs() {
            let opt_outs = queries
                .iter()
                .flat_map(|q| q.opt_out_jobs.iter().cloned().map(ScheduledJob::OptOut));
            jobs.extend(due_jobs(opt_outs, self.priority_date));
        }
        jobs
    }

    async fn step(&self, job: &ScheduledJob, query: &BrokerProfileQuery) {
        let profile_query_id = Some(query.profile_query.id);
        match job {
            ScheduledJob::Scan(_) => {
                match with_timeout(self.timing.scan_timeout, self.runner.scan(query)).await {
                    Ok(outcome) => self.recorder.record_matches(MatchCount {
                        broker_id: self.broker_id,
                        profile_query_id: query.profile_query.id,
                        matches: outcome.matches,
                    }),
                    Err(e) => self.fail(StepKind::Scan, profile_query_id, e),
                }
            }
            ScheduledJob::OptOut(opt_out) => {
                let result =
                    with_timeout(self.timing.opt_out_timeout, self.runner.opt_out(query, opt_out))
                        .await;
                if let Err(e) = result {
                    self.fail(StepKind::OptOut, profile_query_id, e);
                }
            }
        }
    }

    /// Run every due step; returns early and quietly when cancelled
    pub async fn execute(&self, queue_cancel: &CancellationToken) {
        let cancelled = || queue_cancel.is_cancelled() || self.batch_cancel.is_cancelled();
        if cancelled() {
            return;
        }

        let queries: Vec<BrokerProfileQuery> = match self.repository.fetch_all_profile_queries().await
        {
            Ok(all) => all
                .into_iter()
                .filter(|q| q.broker_id() == Some(self.broker_id))
                .collect(),
            Err(e) => {
                self.fail(StepKind::Fetch, None, RunnerError::Other(e.to_string()));
                return;
            }
        };
        let by_id: HashMap<ProfileQueryId, &BrokerProfileQuery> =
            queries.iter().map(|q| (q.profile_query.id, q)).collect();

        let jobs = self.plan(&queries);
        tracing::debug!(broker = %self.broker_name, steps = jobs.len(), "broker collection planned");

        for (i, job) in jobs.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = queue_cancel.cancelled() => return,
                    _ = self.batch_cancel.cancelled() => return,
                    _ = tokio::time::sleep(self.timing.interval) => {}
                }
            }
            if cancelled() {
                return;
            }
            let Some(query) = by_id.get(&job.profile_query_id()) else {
                continue;
            };
            self.step(job, query).await;
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, RunnerError>>,
) -> Result<T, RunnerError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RunnerError::Timeout(limit)),
    }
}

#[async_trait]
impl<R, J, E> QueuedJob for BrokerJobCollection<R, J, E>
where
    R: Repository,
    J: JobRunner,
    E: EventSink,
{
    async fn run(self: Box<Self>, cancel: CancellationToken) {
        self.execute(&cancel).await;
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
