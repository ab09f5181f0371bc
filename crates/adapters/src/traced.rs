// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::notify::{NotifyAdapter, NotifyError};
use crate::repo::{RepoError, Repository};
use crate::runner::{JobRunner, JobRunnerFactory, RunOptions, ScanOutcome};
use async_trait::async_trait;
use tracing::Instrument;
use ul_core::{BrokerProfileQuery, MatchCount, OptOutJobData, RunnerError};

/// Wrapper that adds tracing to any Repository
#[derive(Clone)]
pub struct TracedRepository<R> {
    inner: R,
}

impl<R> TracedRepository<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: Repository> Repository for TracedRepository<R> {
    async fn fetch_all_profile_queries(&self) -> Result<Vec<BrokerProfileQuery>, RepoError> {
        let span = tracing::info_span!("repo.fetch_all_profile_queries");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.fetch_all_profile_queries().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(queries) => tracing::debug!(
                    count = queries.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "fetched profile queries"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "fetch failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn fetch_recorded_matches(&self) -> Result<Vec<MatchCount>, RepoError> {
        let result = self.inner.fetch_recorded_matches().await;
        match &result {
            Ok(matches) => tracing::trace!(count = matches.len(), "fetched recorded matches"),
            Err(e) => tracing::warn!(error = %e, "recorded matches fetch failed"),
        }
        result
    }

    async fn has_profile(&self) -> Result<bool, RepoError> {
        let result = self.inner.has_profile().await;
        tracing::trace!(has_profile = ?result.as_ref().ok(), "checked");
        result
    }

    async fn has_matches(&self) -> Result<bool, RepoError> {
        self.inner.has_matches().await
    }
}

/// Wrapper that adds tracing to every runner a factory creates
#[derive(Clone)]
pub struct TracedRunnerFactory<F> {
    inner: F,
}

impl<F> TracedRunnerFactory<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: JobRunnerFactory> JobRunnerFactory for TracedRunnerFactory<F> {
    type Runner = TracedJobRunner<F::Runner>;

    fn runner(&self, options: RunOptions) -> Self::Runner {
        tracing::trace!(show_ui = options.show_ui, "creating runner");
        TracedJobRunner {
            inner: self.inner.runner(options),
        }
    }
}

pub struct TracedJobRunner<J> {
    inner: J,
}

#[async_trait]
impl<J: JobRunner> JobRunner for TracedJobRunner<J> {
    async fn scan(&self, query: &BrokerProfileQuery) -> Result<ScanOutcome, RunnerError> {
        let span = tracing::info_span!(
            "runner.scan",
            broker = %query.broker.name,
            profile_query = %query.profile_query.id
        );
        async {
            tracing::info!("starting");

            let start = std::time::Instant::now();
            let result = self.inner.scan(query).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(outcome) => tracing::info!(
                    matches = outcome.matches,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "scan finished"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "scan failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn opt_out(
        &self,
        query: &BrokerProfileQuery,
        job: &OptOutJobData,
    ) -> Result<(), RunnerError> {
        let span = tracing::info_span!(
            "runner.opt_out",
            broker = %query.broker.name,
            extracted_profile = job.extracted_profile_id
        );
        async {
            tracing::info!(attempt = job.attempt_count + 1, "starting");

            let start = std::time::Instant::now();
            let result = self.inner.opt_out(query, job).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => {
                    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "opt-out submitted")
                }
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "opt-out failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn request_permission(&self) -> Result<(), NotifyError> {
        let result = self.inner.request_permission().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "notification permission request failed");
        }
        result
    }

    async fn first_scan_completed(&self) -> Result<(), NotifyError> {
        let result = self.inner.first_scan_completed().await;
        match &result {
            Ok(()) => tracing::info!("first scan notification sent"),
            Err(e) => tracing::warn!(error = %e, "first scan notification failed"),
        }
        result
    }

    async fn schedule_check_in(&self) -> Result<(), NotifyError> {
        let result = self.inner.schedule_check_in().await;
        match &result {
            Ok(()) => tracing::info!("check-in notification scheduled"),
            Err(e) => tracing::warn!(error = %e, "check-in scheduling failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
