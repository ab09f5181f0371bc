// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Unlist run-orchestration engine

mod agent;
mod builder;
mod collection;
mod deps;
mod engagement;
mod error;
mod mismatch;
mod queue_manager;
mod recorder;
mod scheduler;
mod updater;
mod work_queue;

pub use agent::{AgentManager, AgentStatus, RunOutcome};
pub use builder::{build_collections, unique_brokers, BatchContext, BrokerRef};
pub use collection::{BrokerJobCollection, StepTiming};
pub use deps::ExecutionDeps;
pub use engagement::EngagementTracker;
pub use error::{AgentError, UpdateError};
pub use mismatch::{compare as compare_matches, reconcile, MatchDelta};
pub use queue_manager::{ActiveBatch, Admission, CompletionHandler, QueueManager};
pub use recorder::{telemetry_for, BatchRecorder};
pub use scheduler::{next_firing, ActivityScheduler};
pub use updater::{compare_versions, BrokerUpdater, DefinitionUpdater, UpdateSummary};
pub use work_queue::{BoundedWorkQueue, QueuedJob};
