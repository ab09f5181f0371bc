// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Brokers, profile queries and the jobs attached to them
//!
//! A [`BrokerProfileQuery`] joins one broker with one search profile and
//! carries that pair's scan job plus any opt-out jobs created for profiles
//! the scan extracted. Due-ness against a priority date lives here so that
//! every caller filters jobs the same way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Stable identity of a broker in the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(pub i64);

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a search profile in the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileQueryId(pub i64);

impl fmt::Display for ProfileQueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An external site that is scanned and opted out of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    /// Assigned by the repository; definition files loaded from disk have none
    #[serde(default)]
    pub id: Option<BrokerId>,
    pub name: String,
    pub url: String,
    /// Dotted version of the broker definition
    pub version: String,
    /// URL of the parent broker when this one mirrors another site
    #[serde(default)]
    pub parent: Option<String>,
}

impl Broker {
    pub fn is_parent(&self) -> bool {
        self.parent.is_none()
    }
}

/// The search profile a broker is queried with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileQuery {
    pub id: ProfileQueryId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub birth_year: Option<u16>,
}

impl ProfileQuery {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Scan bookkeeping for one (broker, profile query) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJobData {
    pub broker_id: BrokerId,
    pub profile_query_id: ProfileQueryId,
    #[serde(default)]
    pub preferred_run_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_run_date: Option<DateTime<Utc>>,
}

impl ScanJobData {
    pub fn new(broker_id: BrokerId, profile_query_id: ProfileQueryId) -> Self {
        Self {
            broker_id,
            profile_query_id,
            preferred_run_date: None,
            last_run_date: None,
        }
    }
}

/// Opt-out bookkeeping for one extracted profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptOutJobData {
    pub broker_id: BrokerId,
    pub profile_query_id: ProfileQueryId,
    pub extracted_profile_id: i64,
    #[serde(default)]
    pub preferred_run_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_run_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempt_count: u32,
    /// Set once the broker confirmed the profile is gone
    #[serde(default)]
    pub removed: bool,
}

/// A single unit of work for a broker collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledJob {
    Scan(ScanJobData),
    OptOut(OptOutJobData),
}

impl ScheduledJob {
    pub fn preferred_run_date(&self) -> Option<DateTime<Utc>> {
        match self {
            ScheduledJob::Scan(job) => job.preferred_run_date,
            ScheduledJob::OptOut(job) => job.preferred_run_date,
        }
    }

    pub fn last_run_date(&self) -> Option<DateTime<Utc>> {
        match self {
            ScheduledJob::Scan(job) => job.last_run_date,
            ScheduledJob::OptOut(job) => job.last_run_date,
        }
    }

    pub fn profile_query_id(&self) -> ProfileQueryId {
        match self {
            ScheduledJob::Scan(job) => job.profile_query_id,
            ScheduledJob::OptOut(job) => job.profile_query_id,
        }
    }

    /// Whether the job should run in a batch with the given priority date.
    ///
    /// Without a priority date every live job is due. With one, the job
    /// needs a preferred date at or before it and must not have already run
    /// after it. Removed opt-outs are never due.
    pub fn is_due(&self, priority_date: Option<DateTime<Utc>>) -> bool {
        if let ScheduledJob::OptOut(job) = self {
            if job.removed {
                return false;
            }
        }
        let Some(cutoff) = priority_date else {
            return true;
        };
        let preferred_ok = self.preferred_run_date().is_some_and(|d| d <= cutoff);
        let recent_run = self.last_run_date().is_some_and(|d| d > cutoff);
        preferred_ok && !recent_run
    }
}

/// Orders jobs by preferred run date, earliest first, undated last
fn by_preferred_date(a: &ScheduledJob, b: &ScheduledJob) -> Ordering {
    match (a.preferred_run_date(), b.preferred_run_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter `jobs` down to the due ones and sort them for execution
pub fn due_jobs(
    jobs: impl IntoIterator<Item = ScheduledJob>,
    priority_date: Option<DateTime<Utc>>,
) -> Vec<ScheduledJob> {
    let mut due: Vec<ScheduledJob> = jobs
        .into_iter()
        .filter(|job| job.is_due(priority_date))
        .collect();
    // stable sort keeps repository order among equal dates
    due.sort_by(by_preferred_date);
    due
}

/// A broker paired with one profile query and that pair's jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerProfileQuery {
    pub broker: Broker,
    pub profile_query: ProfileQuery,
    pub scan_job: ScanJobData,
    #[serde(default)]
    pub opt_out_jobs: Vec<OptOutJobData>,
}

impl BrokerProfileQuery {
    pub fn broker_id(&self) -> Option<BrokerId> {
        self.broker.id
    }
}

/// Number of matches found for one (broker, profile query) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCount {
    pub broker_id: BrokerId,
    pub profile_query_id: ProfileQueryId,
    pub matches: u32,
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
