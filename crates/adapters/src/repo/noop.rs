// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op repository for when no profile has been stored.

use super::{RepoError, Repository};
use async_trait::async_trait;
use ul_core::{BrokerProfileQuery, MatchCount};

/// Repository that is always empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpRepository;

impl NoOpRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Repository for NoOpRepository {
    async fn fetch_all_profile_queries(&self) -> Result<Vec<BrokerProfileQuery>, RepoError> {
        Ok(Vec::new())
    }

    async fn fetch_recorded_matches(&self) -> Result<Vec<MatchCount>, RepoError> {
        Ok(Vec::new())
    }

    async fn has_profile(&self) -> Result<bool, RepoError> {
        Ok(false)
    }
}
