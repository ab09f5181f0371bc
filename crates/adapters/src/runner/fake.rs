// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{JobRunner, JobRunnerFactory, RunOptions, ScanOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use ul_core::{BrokerId, BrokerProfileQuery, OptOutJobData, ProfileQueryId, RunnerError};

/// Recorded runner call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Scan {
        broker_id: Option<BrokerId>,
        profile_query_id: ProfileQueryId,
    },
    OptOut {
        broker_id: Option<BrokerId>,
        profile_query_id: ProfileQueryId,
        extracted_profile_id: i64,
    },
}

#[derive(Default)]
struct FakeRunnerState {
    calls: Vec<(Instant, RunnerCall)>,
    created: Vec<RunOptions>,
    scan_results: HashMap<BrokerId, Result<ScanOutcome, RunnerError>>,
    failing_scans: HashMap<(BrokerId, ProfileQueryId), RunnerError>,
    opt_out_errors: HashMap<BrokerId, RunnerError>,
    step_delay: Duration,
    in_flight: usize,
    max_in_flight: usize,
}

/// Factory handing out runners that share one scripted state
#[derive(Clone, Default)]
pub struct FakeRunnerFactory {
    state: Arc<Mutex<FakeRunnerState>>,
}

impl FakeRunnerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeRunnerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every step sleeps this long before completing
    pub fn set_step_delay(&self, delay: Duration) {
        self.lock().step_delay = delay;
    }

    /// Scans against `broker` report `matches`
    pub fn set_matches(&self, broker: BrokerId, matches: u32) {
        self.lock()
            .scan_results
            .insert(broker, Ok(ScanOutcome { matches }));
    }

    /// Every scan against `broker` fails
    pub fn fail_scans(&self, broker: BrokerId, error: RunnerError) {
        self.lock().scan_results.insert(broker, Err(error));
    }

    /// Only the scan of one profile query on `broker` fails
    pub fn fail_scan(&self, broker: BrokerId, profile_query: ProfileQueryId, error: RunnerError) {
        self.lock()
            .failing_scans
            .insert((broker, profile_query), error);
    }

    pub fn fail_opt_outs(&self, broker: BrokerId, error: RunnerError) {
        self.lock().opt_out_errors.insert(broker, error);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RunnerCall> {
        self.lock().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    /// Recorded calls with the time each step started
    pub fn timed_calls(&self) -> Vec<(Instant, RunnerCall)> {
        self.lock().calls.clone()
    }

    /// Options of every runner created so far
    pub fn created(&self) -> Vec<RunOptions> {
        self.lock().created.clone()
    }

    /// Highest number of steps observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }
}

impl JobRunnerFactory for FakeRunnerFactory {
    type Runner = FakeJobRunner;

    fn runner(&self, options: RunOptions) -> FakeJobRunner {
        self.lock().created.push(options);
        FakeJobRunner {
            factory: self.clone(),
        }
    }
}

/// Fake runner for testing
#[derive(Clone)]
pub struct FakeJobRunner {
    factory: FakeRunnerFactory,
}

impl FakeJobRunner {
    async fn step(&self, call: RunnerCall) {
        let delay = {
            let mut state = self.factory.lock();
            state.calls.push((Instant::now(), call));
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.step_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.factory.lock().in_flight -= 1;
    }
}

#[async_trait]
impl JobRunner for FakeJobRunner {
    async fn scan(&self, query: &BrokerProfileQuery) -> Result<ScanOutcome, RunnerError> {
        self.step(RunnerCall::Scan {
            broker_id: query.broker.id,
            profile_query_id: query.profile_query.id,
        })
        .await;

        let Some(broker) = query.broker.id else {
            return Ok(ScanOutcome::default());
        };
        let state = self.factory.lock();
        if let Some(error) = state.failing_scans.get(&(broker, query.profile_query.id)) {
            return Err(error.clone());
        }
        state
            .scan_results
            .get(&broker)
            .cloned()
            .unwrap_or(Ok(ScanOutcome::default()))
    }

    async fn opt_out(
        &self,
        query: &BrokerProfileQuery,
        job: &OptOutJobData,
    ) -> Result<(), RunnerError> {
        self.step(RunnerCall::OptOut {
            broker_id: query.broker.id,
            profile_query_id: query.profile_query.id,
            extracted_profile_id: job.extracted_profile_id,
        })
        .await;

        let state = self.factory.lock();
        match query.broker.id.and_then(|id| state.opt_out_errors.get(&id)) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
