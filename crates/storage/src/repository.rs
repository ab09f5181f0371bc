// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-file backed repository and broker store

use crate::definitions::load_definitions;
use crate::file::{StateFile, StorageError};
use crate::state::StoredState;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use ul_adapters::{BrokerStore, BrokerStoreError, RepoError, Repository};
use ul_core::{Broker, BrokerId, BrokerProfileQuery, MatchCount};

impl From<StorageError> for RepoError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Json { .. } => RepoError::Corrupt(e.to_string()),
            StorageError::Io(_) | StorageError::Task(_) => RepoError::Unavailable(e.to_string()),
        }
    }
}

impl From<StorageError> for BrokerStoreError {
    fn from(e: StorageError) -> Self {
        BrokerStoreError::Unavailable(e.to_string())
    }
}

/// Repository over a single state file
///
/// Every read loads the file again; nothing is cached between calls.
/// Read-modify-write cycles are serialized within the process.
#[derive(Clone)]
pub struct JsonRepository {
    file: StateFile,
    definitions_dir: Option<PathBuf>,
    include_fake_definitions: bool,
    write_lock: Arc<Mutex<()>>,
}

impl JsonRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: StateFile::new(path),
            definitions_dir: None,
            include_fake_definitions: false,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Directory holding bundled broker definition files
    pub fn with_definitions(mut self, dir: impl Into<PathBuf>, include_fake: bool) -> Self {
        self.definitions_dir = Some(dir.into());
        self.include_fake_definitions = include_fake;
        self
    }

    async fn read<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(StoredState) -> T + Send + 'static,
        T: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.load().map(f))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    async fn update<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut StoredState) -> T + Send + 'static,
        T: Send + 'static,
    {
        let file = self.file.clone();
        let lock = Arc::clone(&self.write_lock);
        tokio::task::spawn_blocking(move || {
            let _held = lock.lock().unwrap_or_else(|e| e.into_inner());
            let mut state = file.load()?;
            let out = f(&mut state);
            file.save(&state)?;
            Ok(out)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Repository for JsonRepository {
    async fn fetch_all_profile_queries(&self) -> Result<Vec<BrokerProfileQuery>, RepoError> {
        Ok(self.read(|s| s.broker_profile_queries()).await?)
    }

    async fn fetch_recorded_matches(&self) -> Result<Vec<MatchCount>, RepoError> {
        Ok(self.read(|s| s.matches).await?)
    }

    async fn has_profile(&self) -> Result<bool, RepoError> {
        Ok(self.read(|s| !s.profile_queries.is_empty()).await?)
    }
}

#[async_trait]
impl BrokerStore for JsonRepository {
    async fn last_checked_version(&self) -> Result<Option<String>, BrokerStoreError> {
        Ok(self.read(|s| s.last_checked_version).await?)
    }

    async fn save_last_checked_version(&self, version: &str) -> Result<(), BrokerStoreError> {
        let version = version.to_string();
        Ok(self
            .update(move |s| s.last_checked_version = Some(version))
            .await?)
    }

    async fn load_definitions(&self) -> Result<Vec<Broker>, BrokerStoreError> {
        let Some(dir) = self.definitions_dir.clone() else {
            return Ok(Vec::new());
        };
        let include_fake = self.include_fake_definitions;
        tokio::task::spawn_blocking(move || load_definitions(&dir, include_fake))
            .await
            .map_err(|e| BrokerStoreError::Unavailable(e.to_string()))?
    }

    async fn find_broker(&self, url: &str) -> Result<Option<Broker>, BrokerStoreError> {
        let url = url.to_string();
        Ok(self
            .read(move |s| s.brokers.into_iter().find(|b| b.url == url))
            .await?)
    }

    async fn add_broker(&self, broker: Broker) -> Result<BrokerId, BrokerStoreError> {
        let now = Utc::now();
        Ok(self.update(move |s| s.add_broker(broker, now)).await?)
    }

    async fn update_broker(&self, id: BrokerId, broker: Broker) -> Result<(), BrokerStoreError> {
        let found = self.update(move |s| s.update_broker(id, broker)).await?;
        if found {
            Ok(())
        } else {
            Err(BrokerStoreError::NotFound(id))
        }
    }

    async fn reset_opt_out_attempts(&self, id: BrokerId) -> Result<(), BrokerStoreError> {
        Ok(self.update(move |s| s.reset_opt_out_attempts(id)).await?)
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
