// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution configuration
//!
//! One value type carries every tunable the queue manager, the broker
//! collections and the activity scheduler read. It is loaded once and
//! passed explicitly into each batch.

use crate::run::RunKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing profile for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Normal,
    /// Shorter same-broker spacing for end-to-end runs
    FastForIntegrationTests,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Ceiling for scheduled scan, opt-out and combined runs
    pub concurrent_operations_different_brokers: usize,
    /// Ceiling for user-triggered manual scans
    pub concurrent_operations_on_manual_scans: usize,
    /// Minimum spacing between two operations against one broker
    #[serde(with = "humantime_serde")]
    pub interval_between_same_broker_operations: Duration,
    #[serde(with = "humantime_serde")]
    pub activity_scheduler_trigger_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub activity_scheduler_interval_tolerance: Duration,
    #[serde(with = "humantime_serde")]
    pub scan_job_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub opt_out_job_timeout: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::for_mode(ExecutionMode::Normal)
    }
}

impl ExecutionConfig {
    pub fn for_mode(mode: ExecutionMode) -> Self {
        let same_broker = match mode {
            ExecutionMode::Normal => Duration::from_secs(2),
            ExecutionMode::FastForIntegrationTests => Duration::from_secs(1),
        };
        Self {
            concurrent_operations_different_brokers: 2,
            concurrent_operations_on_manual_scans: 6,
            interval_between_same_broker_operations: same_broker,
            activity_scheduler_trigger_interval: Duration::from_secs(20 * 60),
            activity_scheduler_interval_tolerance: Duration::from_secs(10 * 60),
            scan_job_timeout: Duration::from_secs(30 * 60),
            opt_out_job_timeout: Duration::from_secs(30 * 60),
        }
    }

    /// How many broker collections may run at once for `kind`
    pub fn concurrency_for(&self, kind: RunKind) -> usize {
        let ceiling = match kind {
            RunKind::ManualScan => self.concurrent_operations_on_manual_scans,
            RunKind::Scan | RunKind::OptOut | RunKind::All => {
                self.concurrent_operations_different_brokers
            }
        };
        // a zero ceiling would never drain
        ceiling.max(1)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
