// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators every batch runs against

use ul_core::ExecutionConfig;

/// Immutable set of collaborators passed into every run decision
#[derive(Clone)]
pub struct ExecutionDeps<R, F, E, N> {
    pub repository: R,
    pub config: ExecutionConfig,
    pub runner_factory: F,
    pub events: E,
    pub notify: N,
}
