// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User notification adapters

mod desktop;

pub use desktop::DesktopNotifier;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
    #[error("notification permission denied")]
    PermissionDenied,
}

/// User-facing notifications raised by the agent
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Ask for permission to show notifications
    async fn request_permission(&self) -> Result<(), NotifyError>;

    /// The first scan after saving a profile finished cleanly
    async fn first_scan_completed(&self) -> Result<(), NotifyError>;

    /// Remind the user to check in on their matches later
    async fn schedule_check_in(&self) -> Result<(), NotifyError>;
}

/// Notifier that shows nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn request_permission(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn first_scan_completed(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn schedule_check_in(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}
