// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry events fired through the event sink

use crate::broker::{BrokerId, ProfileQueryId};
use crate::run::{RunKind, RunPriority};
use serde::{Deserialize, Serialize};

/// Active-use window tracked by the engagement counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl EngagementPeriod {
    pub const ALL: [EngagementPeriod; 3] = [
        EngagementPeriod::Daily,
        EngagementPeriod::Weekly,
        EngagementPeriod::Monthly,
    ];

    /// Days that must pass before the period fires again
    pub fn days(self) -> i64 {
        match self {
            EngagementPeriod::Daily => 1,
            EngagementPeriod::Weekly => 7,
            EngagementPeriod::Monthly => 28,
        }
    }
}

/// Telemetry emitted by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // Batch lifecycle
    BatchStarted {
        kind: RunKind,
        priority: RunPriority,
    },
    Engagement {
        period: EngagementPeriod,
    },
    Monitoring {
        profile_queries: usize,
        brokers: usize,
    },

    // Per-broker failures
    HttpError {
        broker: String,
        code: u16,
    },
    ActionFailed {
        broker: String,
        action_id: String,
        message: String,
    },
    OtherError {
        broker: String,
        message: String,
    },

    // Broker definitions
    BrokerUpdateFailed {
        broker: String,
        message: String,
    },

    MatchMismatch {
        broker_id: BrokerId,
        profile_query_id: ProfileQueryId,
        recorded: u32,
        observed: u32,
    },

    // Immediate scan outcome after a profile is saved
    ImmediateScansInterrupted,
    ImmediateScansFinishedWithError {
        message: String,
    },
    ImmediateScansFinishedWithoutError,
    InitialScanTotalDuration {
        duration_ms: u64,
        profile_queries: usize,
    },

    // Scheduled run outcome after app launch
    AppLaunchedScheduledRunInterrupted,
    AppLaunchedScheduledRunBlocked,
    AppLaunchedScheduledRunFinishedWithError {
        message: String,
    },
    AppLaunchedScheduledRunFinishedWithoutError,
}

impl Event {
    /// Get the event name for logging
    /// Format: "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            Event::BatchStarted { .. } => "batch:started",
            Event::Engagement { .. } => "engagement:active",
            Event::Monitoring { .. } => "monitoring:stats",

            Event::HttpError { .. } => "operation:http_error",
            Event::ActionFailed { .. } => "operation:action_failed",
            Event::OtherError { .. } => "operation:other_error",

            Event::BrokerUpdateFailed { .. } => "broker:update_failed",
            Event::MatchMismatch { .. } => "scan:match_mismatch",

            Event::ImmediateScansInterrupted => "immediate:interrupted",
            Event::ImmediateScansFinishedWithError { .. } => "immediate:finished_with_error",
            Event::ImmediateScansFinishedWithoutError => "immediate:finished_without_error",
            Event::InitialScanTotalDuration { .. } => "immediate:total_duration",

            Event::AppLaunchedScheduledRunInterrupted => "app_launch:interrupted",
            Event::AppLaunchedScheduledRunBlocked => "app_launch:blocked",
            Event::AppLaunchedScheduledRunFinishedWithError { .. } => {
                "app_launch:finished_with_error"
            }
            Event::AppLaunchedScheduledRunFinishedWithoutError => {
                "app_launch:finished_without_error"
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
