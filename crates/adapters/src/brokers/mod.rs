// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker definition storage

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BrokerStoreCall, FakeBrokerStore};

use async_trait::async_trait;
use thiserror::Error;
use ul_core::{Broker, BrokerId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerStoreError {
    #[error("broker store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid broker definition {file}: {message}")]
    InvalidDefinition { file: String, message: String },
    #[error("broker not found: {0}")]
    NotFound(BrokerId),
}

/// Persistent broker records plus the version they were last refreshed at
#[async_trait]
pub trait BrokerStore: Clone + Send + Sync + 'static {
    async fn last_checked_version(&self) -> Result<Option<String>, BrokerStoreError>;

    async fn save_last_checked_version(&self, version: &str) -> Result<(), BrokerStoreError>;

    /// Bundled broker definitions, as shipped with this version
    async fn load_definitions(&self) -> Result<Vec<Broker>, BrokerStoreError>;

    /// Look a stored broker up by its url
    async fn find_broker(&self, url: &str) -> Result<Option<Broker>, BrokerStoreError>;

    /// Store a new broker and seed a scan job for every profile query
    async fn add_broker(&self, broker: Broker) -> Result<BrokerId, BrokerStoreError>;

    async fn update_broker(&self, id: BrokerId, broker: Broker) -> Result<(), BrokerStoreError>;

    /// Zero the attempt counters of every opt-out job on `id`
    async fn reset_opt_out_attempts(&self, id: BrokerId) -> Result<(), BrokerStoreError>;
}
