// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op runner for dry runs.

use super::{JobRunner, JobRunnerFactory, RunOptions, ScanOutcome};
use async_trait::async_trait;
use ul_core::{BrokerProfileQuery, OptOutJobData, RunnerError};

/// Runner whose steps succeed immediately and find nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpJobRunner;

#[async_trait]
impl JobRunner for NoOpJobRunner {
    async fn scan(&self, _query: &BrokerProfileQuery) -> Result<ScanOutcome, RunnerError> {
        Ok(ScanOutcome::default())
    }

    async fn opt_out(
        &self,
        _query: &BrokerProfileQuery,
        _job: &OptOutJobData,
    ) -> Result<(), RunnerError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpRunnerFactory;

impl JobRunnerFactory for NoOpRunnerFactory {
    type Runner = NoOpJobRunner;

    fn runner(&self, _options: RunOptions) -> NoOpJobRunner {
        NoOpJobRunner
    }
}
