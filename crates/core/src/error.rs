// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch outcome and error types

use crate::broker::{BrokerId, ProfileQueryId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single scan or opt-out call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("http error {code}")]
    Http { code: u16 },
    #[error("action {action_id} failed: {message}")]
    ActionFailed { action_id: String, message: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("command exited with {exit_code}: {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

/// Run-mode transition failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("run was interrupted by a higher priority run")]
    Interrupted,
    #[error("active run cannot be interrupted")]
    CannotInterrupt,
}

/// A batch-level failure; at most one per batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("failed to fetch profile queries: {0}")]
    Fetch(String),
}

/// Which step of a broker collection failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Fetch,
    Scan,
    OptOut,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepKind::Fetch => "fetch",
            StepKind::Scan => "scan",
            StepKind::OptOut => "opt-out",
        })
    }
}

/// A failure isolated to one broker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{broker} ({broker_id}) {step}{}: {source}", .profile_query_id.map(|id| format!(" profile {id}")).unwrap_or_default())]
pub struct OperationError {
    pub broker: String,
    pub broker_id: BrokerId,
    pub profile_query_id: Option<ProfileQueryId>,
    pub step: StepKind,
    pub source: RunnerError,
}

/// Aggregated outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollection {
    pub one_time_error: Option<BatchError>,
    pub operation_errors: Vec<OperationError>,
}

impl ErrorCollection {
    pub fn one_time(error: impl Into<BatchError>) -> Self {
        Self {
            one_time_error: Some(error.into()),
            operation_errors: Vec::new(),
        }
    }

    pub fn interrupted() -> Self {
        Self::one_time(QueueError::Interrupted)
    }

    pub fn is_empty(&self) -> bool {
        self.one_time_error.is_none() && self.operation_errors.is_empty()
    }

    pub fn is_interrupted(&self) -> bool {
        self.one_time_error == Some(BatchError::Queue(QueueError::Interrupted))
    }

    /// `None` when nothing went wrong
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
