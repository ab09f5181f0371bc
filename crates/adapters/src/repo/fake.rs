// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake repository for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RepoError, Repository};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use ul_core::{
    Broker, BrokerId, BrokerProfileQuery, MatchCount, ProfileQuery, ProfileQueryId, ScanJobData,
};

/// Recorded repository call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    FetchAllProfileQueries,
    FetchRecordedMatches,
    HasProfile,
}

#[derive(Default)]
struct FakeRepoState {
    queries: Vec<BrokerProfileQuery>,
    matches: Vec<MatchCount>,
    fetch_error: Option<RepoError>,
    /// Fail only fetches after this many succeeded
    fail_after: Option<usize>,
    fetches: usize,
}

/// Fake repository for testing
#[derive(Clone, Default)]
pub struct FakeRepository {
    state: Arc<Mutex<FakeRepoState>>,
    calls: Arc<Mutex<Vec<RepoCall>>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queries(queries: Vec<BrokerProfileQuery>) -> Self {
        let repo = Self::new();
        repo.set_queries(queries);
        repo
    }

    pub fn set_queries(&self, queries: Vec<BrokerProfileQuery>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).queries = queries;
    }

    pub fn set_matches(&self, matches: Vec<MatchCount>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).matches = matches;
    }

    /// Make every profile query fetch fail with `error`
    pub fn fail_fetches(&self, error: RepoError) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fetch_error = Some(error);
        state.fail_after = None;
    }

    /// Let `successes` fetches through, then fail the rest with `error`
    pub fn fail_fetches_after(&self, successes: usize, error: RepoError) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fetch_error = Some(error);
        state.fail_after = Some(successes);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: RepoCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl Repository for FakeRepository {
    async fn fetch_all_profile_queries(&self) -> Result<Vec<BrokerProfileQuery>, RepoError> {
        self.record(RepoCall::FetchAllProfileQueries);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let attempt = state.fetches;
        state.fetches += 1;
        if let Some(error) = &state.fetch_error {
            let failing = match state.fail_after {
                Some(n) => attempt >= n,
                None => true,
            };
            if failing {
                return Err(error.clone());
            }
        }
        Ok(state.queries.clone())
    }

    async fn fetch_recorded_matches(&self) -> Result<Vec<MatchCount>, RepoError> {
        self.record(RepoCall::FetchRecordedMatches);
        Ok(self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .matches
            .clone())
    }

    async fn has_profile(&self) -> Result<bool, RepoError> {
        self.record(RepoCall::HasProfile);
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(!state.queries.is_empty())
    }
}

/// Build a profile query for broker `broker_id` with a fresh scan job
pub fn sample_query(broker_id: i64, profile_query_id: i64) -> BrokerProfileQuery {
    BrokerProfileQuery {
        broker: Broker {
            id: Some(BrokerId(broker_id)),
            name: format!("broker-{broker_id}"),
            url: format!("broker-{broker_id}.example"),
            version: "1.0.0".to_string(),
            parent: None,
        },
        profile_query: ProfileQuery {
            id: ProfileQueryId(profile_query_id),
            first_name: "Jane".to_string(),
            last_name: format!("Doe{profile_query_id}"),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            birth_year: Some(1980),
        },
        scan_job: ScanJobData::new(BrokerId(broker_id), ProfileQueryId(profile_query_id)),
        opt_out_jobs: Vec::new(),
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
