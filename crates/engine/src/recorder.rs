// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-batch result recording

use std::sync::{Arc, Mutex};
use ul_adapters::EventSink;
use ul_core::{Event, MatchCount, OperationError, RunnerError};

#[derive(Default)]
struct Recorded {
    errors: Vec<OperationError>,
    observed: Vec<MatchCount>,
}

/// Collects per-broker errors and observed match counts for one batch
///
/// Shared by every collection of the batch; drained once at the end.
#[derive(Clone, Default)]
pub struct BatchRecorder {
    inner: Arc<Mutex<Recorded>>,
}

impl BatchRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a per-broker failure and fire its telemetry
    pub fn record_error<E: EventSink>(&self, error: OperationError, events: &E) {
        events.fire(telemetry_for(&error));
        self.lock().errors.push(error);
    }

    pub fn record_matches(&self, observed: MatchCount) {
        self.lock().observed.push(observed);
    }

    pub fn take_errors(&self) -> Vec<OperationError> {
        std::mem::take(&mut self.lock().errors)
    }

    pub fn take_observed(&self) -> Vec<MatchCount> {
        std::mem::take(&mut self.lock().observed)
    }
}

/// Map a per-broker failure onto its telemetry event
pub fn telemetry_for(error: &OperationError) -> Event {
    let broker = error.broker.clone();
    match &error.source {
        RunnerError::Http { code } => Event::HttpError {
            broker,
            code: *code,
        },
        RunnerError::ActionFailed { action_id, message } => Event::ActionFailed {
            broker,
            action_id: action_id.clone(),
            message: message.clone(),
        },
        other => Event::OtherError {
            broker,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
