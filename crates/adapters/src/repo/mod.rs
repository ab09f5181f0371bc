// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile query repository adapters

mod noop;

pub use noop::NoOpRepository;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{sample_query, FakeRepository, RepoCall};

use async_trait::async_trait;
use thiserror::Error;
use ul_core::{BrokerProfileQuery, MatchCount};

/// Errors from repository reads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("repository data is corrupt: {0}")]
    Corrupt(String),
}

/// Read access to brokers, profile queries and recorded scan results
///
/// Every call reads current state; callers never cache across batches.
#[async_trait]
pub trait Repository: Clone + Send + Sync + 'static {
    /// Every (broker, profile query) pair with its jobs
    async fn fetch_all_profile_queries(&self) -> Result<Vec<BrokerProfileQuery>, RepoError>;

    /// Match counts recorded per (broker, profile query)
    async fn fetch_recorded_matches(&self) -> Result<Vec<MatchCount>, RepoError>;

    /// Whether the user has saved a profile at all
    async fn has_profile(&self) -> Result<bool, RepoError>;

    /// Whether any recorded match exists
    async fn has_matches(&self) -> Result<bool, RepoError> {
        let matches = self.fetch_recorded_matches().await?;
        Ok(matches.iter().any(|m| m.matches > 0))
    }
}
