// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ul-core: domain types for the unlist broker agent
//!
//! This crate provides:
//! - Broker, profile query and job records with due-date filtering
//! - Run kinds, run priorities and the batch result type (`ErrorCollection`)
//! - The single `ExecutionConfig` threaded through every batch
//! - Telemetry events and clock/id abstractions
//!
//! Nothing in here performs I/O.

pub mod broker;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod run;

pub use broker::{
    due_jobs, Broker, BrokerId, BrokerProfileQuery, MatchCount, OptOutJobData, ProfileQuery,
    ProfileQueryId, ScanJobData, ScheduledJob,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ExecutionConfig, ExecutionMode};
pub use error::{BatchError, ErrorCollection, OperationError, QueueError, RunnerError, StepKind};
pub use event::{EngagementPeriod, Event};
pub use id::{BatchId, BatchIdGen, SequentialBatchIdGen, UuidBatchIdGen};
pub use run::{RunKind, RunPriority};
