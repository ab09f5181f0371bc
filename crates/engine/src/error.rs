// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;
use ul_adapters::{BrokerStoreError, RepoError};

/// Errors refreshing broker definitions
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("broker store error: {0}")]
    Store(#[from] BrokerStoreError),
}

/// Errors from orchestrator flows that are not batch outcomes
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("repository error: {0}")]
    Repository(#[from] RepoError),
    #[error("run completion was dropped")]
    CompletionDropped,
}
