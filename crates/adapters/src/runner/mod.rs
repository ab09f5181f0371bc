// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job runner adapters
//!
//! A runner performs exactly one scan or opt-out step against a broker.
//! The factory hands out a fresh runner for every broker collection.

mod noop;
mod shell;

pub use noop::{NoOpJobRunner, NoOpRunnerFactory};
pub use shell::{ShellCommands, ShellJobRunner, ShellRunnerFactory};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobRunner, FakeRunnerFactory, RunnerCall};

use async_trait::async_trait;
use ul_core::{BrokerProfileQuery, OptOutJobData, RunnerError};

/// Options a runner is created with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Show the automation surface instead of running headless
    pub show_ui: bool,
}

/// Result of a successful scan step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub matches: u32,
}

/// Performs single scan and opt-out steps
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    async fn scan(&self, query: &BrokerProfileQuery) -> Result<ScanOutcome, RunnerError>;

    async fn opt_out(
        &self,
        query: &BrokerProfileQuery,
        job: &OptOutJobData,
    ) -> Result<(), RunnerError>;
}

/// Produces a fresh runner per broker collection
pub trait JobRunnerFactory: Clone + Send + Sync + 'static {
    type Runner: JobRunner;

    fn runner(&self, options: RunOptions) -> Self::Runner;
}
