// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded notification call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyCall {
    RequestPermission,
    FirstScanCompleted,
    ScheduleCheckIn,
}

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: NotifyCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn request_permission(&self) -> Result<(), NotifyError> {
        self.record(NotifyCall::RequestPermission);
        Ok(())
    }

    async fn first_scan_completed(&self) -> Result<(), NotifyError> {
        self.record(NotifyCall::FirstScanCompleted);
        Ok(())
    }

    async fn schedule_check_in(&self) -> Result<(), NotifyError> {
        self.record(NotifyCall::ScheduleCheckIn);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
