// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake broker store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BrokerStore, BrokerStoreError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use ul_core::{Broker, BrokerId};

/// Recorded broker store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerStoreCall {
    SaveVersion(String),
    Add(String),
    Update(BrokerId),
    ResetOptOutAttempts(BrokerId),
}

#[derive(Default)]
struct FakeStoreState {
    version: Option<String>,
    definitions: Vec<Broker>,
    stored: Vec<Broker>,
    failing_urls: Vec<String>,
    next_id: i64,
}

/// In-memory broker store
#[derive(Clone, Default)]
pub struct FakeBrokerStore {
    state: Arc<Mutex<FakeStoreState>>,
    calls: Arc<Mutex<Vec<BrokerStoreCall>>>,
}

impl FakeBrokerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeStoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_version(&self, version: &str) {
        self.lock().version = Some(version.to_string());
    }

    pub fn set_definitions(&self, definitions: Vec<Broker>) {
        self.lock().definitions = definitions;
    }

    /// Seed an already-stored broker, assigning it an id
    pub fn store(&self, mut broker: Broker) -> BrokerId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = BrokerId(state.next_id);
        broker.id = Some(id);
        state.stored.push(broker);
        id
    }

    /// Writes for a broker with this url fail
    pub fn fail_writes_for(&self, url: &str) {
        self.lock().failing_urls.push(url.to_string());
    }

    pub fn stored(&self) -> Vec<Broker> {
        self.lock().stored.clone()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BrokerStoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: BrokerStoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl BrokerStore for FakeBrokerStore {
    async fn last_checked_version(&self) -> Result<Option<String>, BrokerStoreError> {
        Ok(self.lock().version.clone())
    }

    async fn save_last_checked_version(&self, version: &str) -> Result<(), BrokerStoreError> {
        self.record(BrokerStoreCall::SaveVersion(version.to_string()));
        self.lock().version = Some(version.to_string());
        Ok(())
    }

    async fn load_definitions(&self) -> Result<Vec<Broker>, BrokerStoreError> {
        Ok(self.lock().definitions.clone())
    }

    async fn find_broker(&self, url: &str) -> Result<Option<Broker>, BrokerStoreError> {
        Ok(self.lock().stored.iter().find(|b| b.url == url).cloned())
    }

    async fn add_broker(&self, broker: Broker) -> Result<BrokerId, BrokerStoreError> {
        self.record(BrokerStoreCall::Add(broker.url.clone()));
        if self.lock().failing_urls.contains(&broker.url) {
            return Err(BrokerStoreError::Unavailable(broker.url));
        }
        Ok(self.store(broker))
    }

    async fn update_broker(&self, id: BrokerId, broker: Broker) -> Result<(), BrokerStoreError> {
        self.record(BrokerStoreCall::Update(id));
        let mut state = self.lock();
        if state.failing_urls.contains(&broker.url) {
            return Err(BrokerStoreError::Unavailable(broker.url));
        }
        let slot = state
            .stored
            .iter_mut()
            .find(|b| b.id == Some(id))
            .ok_or(BrokerStoreError::NotFound(id))?;
        *slot = Broker {
            id: Some(id),
            ..broker
        };
        Ok(())
    }

    async fn reset_opt_out_attempts(&self, id: BrokerId) -> Result<(), BrokerStoreError> {
        self.record(BrokerStoreCall::ResetOptOutAttempts(id));
        Ok(())
    }
}
