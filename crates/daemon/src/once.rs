// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot mode: run a single batch and print what went wrong

use std::fmt::Write;
use std::str::FromStr;

use thiserror::Error;
use ul_adapters::{
    Entitlement, EventSink, JobRunnerFactory, NotifyAdapter, Repository, RunOptions,
};
use ul_core::{BatchIdGen, Clock, ErrorCollection, QueueError, RunKind, RunPriority};
use ul_engine::{AgentError, AgentManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnceMode {
    /// Manual scan, as after a profile save
    Immediate,
    /// Scheduled run of the entitlement's kind
    Scheduled,
    /// Every due opt-out, no scans
    OptOut,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run mode {0:?} (expected immediate, scheduled or opt-out)")]
pub struct ParseModeError(String);

impl FromStr for OnceMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(OnceMode::Immediate),
            "scheduled" => Ok(OnceMode::Scheduled),
            "opt-out" => Ok(OnceMode::OptOut),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl OnceMode {
    pub fn run(self, scheduled_kind: RunKind) -> (RunKind, RunPriority) {
        match self {
            OnceMode::Immediate => (RunKind::ManualScan, RunPriority::Immediate),
            OnceMode::Scheduled => (scheduled_kind, RunPriority::Scheduled),
            OnceMode::OptOut => (RunKind::OptOut, RunPriority::Immediate),
        }
    }
}

/// Run one batch to completion
///
/// A declined run is reported as a `cannot interrupt` one-time error.
/// Returns after post-run reconciliation has finished.
pub async fn run_once<R, F, E, N, T, C, I>(
    agent: &AgentManager<R, F, E, N, T, C, I>,
    mode: OnceMode,
    show_ui: bool,
) -> Result<Option<ErrorCollection>, AgentError>
where
    R: Repository,
    F: JobRunnerFactory,
    E: EventSink,
    N: NotifyAdapter,
    T: Entitlement,
    C: Clock,
    I: BatchIdGen,
{
    let (kind, priority) = mode.run(agent.scheduled_kind());
    tracing::info!(kind = kind.as_str(), priority = priority.as_str(), "running one batch");
    let (admission, errors) = agent
        .run_and_wait(kind, priority, RunOptions { show_ui })
        .await?;
    if !admission.is_accepted() {
        return Ok(Some(ErrorCollection::one_time(QueueError::CannotInterrupt)));
    }
    agent.settle().await;
    Ok(errors)
}

/// Deterministic multi-line summary of a batch outcome
pub fn render_summary(errors: Option<&ErrorCollection>) -> String {
    let mut out = String::new();
    let one_time = errors
        .and_then(|e| e.one_time_error.as_ref())
        .map_or_else(|| "none".to_string(), |e| e.to_string());
    let operation_errors = errors.map(|e| e.operation_errors.as_slice()).unwrap_or_default();

    let _ = writeln!(out, "one-time error: {one_time}");
    let _ = writeln!(out, "operation errors: {}", operation_errors.len());
    for error in operation_errors {
        let _ = writeln!(out, "  {error}");
    }
    out
}

/// 0 unless the batch had a one-time error
pub fn exit_code(errors: Option<&ErrorCollection>) -> u8 {
    match errors.and_then(|e| e.one_time_error.as_ref()) {
        Some(_) => 1,
        None => 0,
    }
}

#[cfg(test)]
#[path = "once_tests.rs"]
mod tests;
