// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns the repository's profile queries into one collection per broker

use crate::collection::{BrokerJobCollection, StepTiming};
use crate::deps::ExecutionDeps;
use crate::recorder::BatchRecorder;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use ul_adapters::{EventSink, JobRunnerFactory, Repository, RunOptions};
use ul_core::{BatchError, BrokerId, BrokerProfileQuery, RunKind};

/// Per-batch inputs shared by every collection
#[derive(Clone)]
pub struct BatchContext {
    pub kind: RunKind,
    pub priority_date: Option<DateTime<Utc>>,
    pub options: RunOptions,
    pub recorder: BatchRecorder,
    pub cancel: CancellationToken,
}

/// A broker appearing in the fetched queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerRef {
    pub id: BrokerId,
    pub name: String,
}

/// Distinct brokers in first-seen order; brokers without an id are skipped
pub fn unique_brokers(queries: &[BrokerProfileQuery]) -> Vec<BrokerRef> {
    let mut seen = HashSet::new();
    queries
        .iter()
        .filter_map(|q| {
            let id = q.broker.id?;
            seen.insert(id).then(|| BrokerRef {
                id,
                name: q.broker.name.clone(),
            })
        })
        .collect()
}

pub type Collection<R, F, E> = BrokerJobCollection<R, <F as JobRunnerFactory>::Runner, E>;

/// Fetch current queries and build one collection per distinct broker
///
/// Each collection gets its own runner instance.
pub async fn build_collections<R, F, E, N>(
    deps: &ExecutionDeps<R, F, E, N>,
    ctx: &BatchContext,
) -> Result<Vec<Collection<R, F, E>>, BatchError>
where
    R: Repository,
    F: JobRunnerFactory,
    E: EventSink,
{
    let queries = deps
        .repository
        .fetch_all_profile_queries()
        .await
        .map_err(|e| BatchError::Fetch(e.to_string()))?;

    let timing = StepTiming {
        interval: deps.config.interval_between_same_broker_operations,
        scan_timeout: deps.config.scan_job_timeout,
        opt_out_timeout: deps.config.opt_out_job_timeout,
    };

    let collections = unique_brokers(&queries)
        .into_iter()
        .map(|broker| {
            BrokerJobCollection::new(
                broker.id,
                broker.name,
                ctx.kind,
                ctx.priority_date,
                timing,
                deps.repository.clone(),
                deps.runner_factory.runner(ctx.options),
                deps.events.clone(),
                ctx.recorder.clone(),
                ctx.cancel.clone(),
            )
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        queries = queries.len(),
        brokers = collections.len(),
        "built broker collections"
    );
    Ok(collections)
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
