// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the agent's external collaborators

pub mod brokers;
pub mod entitlement;
pub mod events;
pub mod notify;
pub mod repo;
pub mod runner;
pub mod traced;

pub use brokers::{BrokerStore, BrokerStoreError};
pub use entitlement::{Entitlement, StaticEntitlement};
pub use events::{EventSink, NoOpEventSink, TracingEventSink};
pub use notify::{DesktopNotifier, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use repo::{NoOpRepository, RepoError, Repository};
pub use runner::{
    JobRunner, JobRunnerFactory, NoOpJobRunner, NoOpRunnerFactory, RunOptions, ScanOutcome,
    ShellCommands, ShellJobRunner, ShellRunnerFactory,
};
pub use traced::{TracedJobRunner, TracedNotifyAdapter, TracedRepository, TracedRunnerFactory};
pub use ul_core::RunnerError;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use brokers::{BrokerStoreCall, FakeBrokerStore};
#[cfg(any(test, feature = "test-support"))]
pub use events::FakeEventSink;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use repo::{sample_query, FakeRepository, RepoCall};
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeJobRunner, FakeRunnerFactory, RunnerCall};
