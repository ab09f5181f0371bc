// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker definition refresh run before every batch

use crate::error::UpdateError;
use async_trait::async_trait;
use std::cmp::Ordering;
use ul_adapters::{BrokerStore, BrokerStoreError, EventSink};
use ul_core::{Broker, Event};

/// Refreshes broker definitions; never fails the batch that invoked it
#[async_trait]
pub trait DefinitionUpdater: Send + Sync + 'static {
    async fn check_for_updates(&self);
}

/// Numeric comparison of dotted versions (`1.10` > `1.9`, `1.0` == `1`)
///
/// Non-numeric components compare as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = a
            .get(i)
            .copied()
            .unwrap_or(0)
            .cmp(&b.get(i).copied().unwrap_or(0));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// What one refresh did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// The app version was not newer than the last check
    pub skipped: bool,
    pub added: usize,
    pub updated: usize,
    pub failed: usize,
}

enum Applied {
    Added,
    Updated,
    Unchanged,
}

pub struct BrokerUpdater<S, E> {
    store: S,
    events: E,
    app_version: String,
}

impl<S: BrokerStore, E: EventSink> BrokerUpdater<S, E> {
    pub fn new(store: S, events: E, app_version: impl Into<String>) -> Self {
        Self {
            store,
            events,
            app_version: app_version.into(),
        }
    }

    /// Refresh stored brokers when the app version moved past the last check
    pub async fn refresh(&self) -> Result<UpdateSummary, UpdateError> {
        if let Some(last) = self.store.last_checked_version().await? {
            if compare_versions(&self.app_version, &last) != Ordering::Greater {
                return Ok(UpdateSummary {
                    skipped: true,
                    ..UpdateSummary::default()
                });
            }
        }

        self.store
            .save_last_checked_version(&self.app_version)
            .await?;
        let definitions = self.store.load_definitions().await?;

        let mut summary = UpdateSummary::default();
        for definition in definitions {
            let name = definition.name.clone();
            match self.apply(definition).await {
                Ok(Applied::Added) => summary.added += 1,
                Ok(Applied::Updated) => summary.updated += 1,
                Ok(Applied::Unchanged) => {}
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(broker = %name, error = %e, "broker update failed");
                    self.events.fire(Event::BrokerUpdateFailed {
                        broker: name,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    async fn apply(&self, definition: Broker) -> Result<Applied, BrokerStoreError> {
        let Some(stored) = self.store.find_broker(&definition.url).await? else {
            self.store.add_broker(definition).await?;
            return Ok(Applied::Added);
        };
        if compare_versions(&definition.version, &stored.version) != Ordering::Greater {
            return Ok(Applied::Unchanged);
        }
        let Some(id) = stored.id else {
            return Ok(Applied::Unchanged);
        };
        let parent = definition.is_parent();
        self.store.update_broker(id, definition).await?;
        if parent {
            self.store.reset_opt_out_attempts(id).await?;
        }
        Ok(Applied::Updated)
    }
}

#[async_trait]
impl<S: BrokerStore, E: EventSink> DefinitionUpdater for BrokerUpdater<S, E> {
    async fn check_for_updates(&self) {
        match self.refresh().await {
            Ok(summary) if summary.skipped => {
                tracing::debug!(version = %self.app_version, "broker definitions up to date");
            }
            Ok(summary) => tracing::info!(
                version = %self.app_version,
                added = summary.added,
                updated = summary.updated,
                failed = summary.failed,
                "broker definitions refreshed"
            ),
            Err(e) => tracing::warn!(error = %e, "broker definition refresh failed"),
        }
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
