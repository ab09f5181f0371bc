// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notifications
//!
//! Uses terminal-notifier on macOS and notify-send on Linux. Other
//! platforms only log.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::time::Duration;

const FIRST_SCAN_TITLE: &str = "Your first scan is complete";
const FIRST_SCAN_MESSAGE: &str = "Open the app to review what was found.";
const CHECK_IN_TITLE: &str = "Removal progress";
const CHECK_IN_MESSAGE: &str = "Opt-out requests are in progress. Check in to see what changed.";

#[derive(Clone, Debug)]
pub struct DesktopNotifier {
    check_in_delay: Duration,
}

impl DesktopNotifier {
    pub fn new(check_in_delay: Duration) -> Self {
        Self { check_in_delay }
    }

    async fn show(title: &str, message: &str) -> Result<(), NotifyError> {
        #[cfg(target_os = "macos")]
        let output = tokio::process::Command::new("terminal-notifier")
            .args(["-title", title, "-message", message, "-sound", "default"])
            .output()
            .await;
        #[cfg(target_os = "linux")]
        let output = tokio::process::Command::new("notify-send")
            .args([title, message])
            .output()
            .await;

        #[cfg(any(target_os = "macos", target_os = "linux"))]
        {
            let output = output.map_err(|e| NotifyError::Failed(e.to_string()))?;
            if !output.status.success() {
                return Err(NotifyError::Failed(
                    String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ));
            }
        }
        tracing::info!(title, message, "desktop notification sent");
        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        // one week
        Self::new(Duration::from_secs(7 * 24 * 60 * 60))
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifier {
    async fn request_permission(&self) -> Result<(), NotifyError> {
        // desktop notification daemons do not gate on permission
        Ok(())
    }

    async fn first_scan_completed(&self) -> Result<(), NotifyError> {
        Self::show(FIRST_SCAN_TITLE, FIRST_SCAN_MESSAGE).await
    }

    async fn schedule_check_in(&self) -> Result<(), NotifyError> {
        let delay = self.check_in_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = Self::show(CHECK_IN_TITLE, CHECK_IN_MESSAGE).await {
                tracing::warn!(error = %e, "check-in notification failed");
            }
        });
        tracing::info!(delay_secs = delay.as_secs(), "check-in notification scheduled");
        Ok(())
    }
}
