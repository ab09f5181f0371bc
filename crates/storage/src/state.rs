// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stored agent state document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ul_core::{
    Broker, BrokerId, BrokerProfileQuery, MatchCount, OptOutJobData, ProfileQuery, ScanJobData,
};

/// Everything the agent persists, as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredState {
    pub brokers: Vec<Broker>,
    pub profile_queries: Vec<ProfileQuery>,
    pub scan_jobs: Vec<ScanJobData>,
    pub opt_out_jobs: Vec<OptOutJobData>,
    pub matches: Vec<MatchCount>,
    pub last_checked_version: Option<String>,
}

impl StoredState {
    pub fn broker(&self, id: BrokerId) -> Option<&Broker> {
        self.brokers.iter().find(|b| b.id == Some(id))
    }

    /// Join every scan job with its broker, profile query and opt-outs.
    ///
    /// Scan jobs pointing at a missing broker or profile query are dropped.
    pub fn broker_profile_queries(&self) -> Vec<BrokerProfileQuery> {
        self.scan_jobs
            .iter()
            .filter_map(|scan| {
                let broker = self.broker(scan.broker_id)?;
                let profile_query = self
                    .profile_queries
                    .iter()
                    .find(|q| q.id == scan.profile_query_id)?;
                let opt_out_jobs = self
                    .opt_out_jobs
                    .iter()
                    .filter(|o| {
                        o.broker_id == scan.broker_id && o.profile_query_id == scan.profile_query_id
                    })
                    .cloned()
                    .collect();
                Some(BrokerProfileQuery {
                    broker: broker.clone(),
                    profile_query: profile_query.clone(),
                    scan_job: scan.clone(),
                    opt_out_jobs,
                })
            })
            .collect()
    }

    fn next_broker_id(&self) -> BrokerId {
        let max = self
            .brokers
            .iter()
            .filter_map(|b| b.id)
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        BrokerId(max + 1)
    }

    /// Insert a broker and seed a scan job for every profile query
    ///
    /// Seeded scans are preferred at `now`, so the next run of any
    /// priority picks them up.
    pub fn add_broker(&mut self, mut broker: Broker, now: DateTime<Utc>) -> BrokerId {
        let id = self.next_broker_id();
        broker.id = Some(id);
        self.brokers.push(broker);
        let seeded: Vec<ScanJobData> = self
            .profile_queries
            .iter()
            .map(|q| ScanJobData {
                preferred_run_date: Some(now),
                ..ScanJobData::new(id, q.id)
            })
            .collect();
        self.scan_jobs.extend(seeded);
        id
    }

    /// Replace a stored broker's definition, keeping its id
    pub fn update_broker(&mut self, id: BrokerId, broker: Broker) -> bool {
        match self.brokers.iter_mut().find(|b| b.id == Some(id)) {
            Some(slot) => {
                *slot = Broker {
                    id: Some(id),
                    ..broker
                };
                true
            }
            None => false,
        }
    }

    pub fn reset_opt_out_attempts(&mut self, id: BrokerId) {
        for job in self.opt_out_jobs.iter_mut().filter(|j| j.broker_id == id) {
            job.attempt_count = 0;
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
