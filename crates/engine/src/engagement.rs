// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily, weekly and monthly active-use counters

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use ul_adapters::EventSink;
use ul_core::{Clock, EngagementPeriod, Event};

/// Fires each engagement period at most once per its length in days
///
/// Last-fired times live in memory only; a restart fires every period again.
#[derive(Clone)]
pub struct EngagementTracker<C> {
    clock: C,
    last_fired: Arc<Mutex<HashMap<EngagementPeriod, DateTime<Utc>>>>,
}

impl<C: Clock> EngagementTracker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_fired: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fire every period that is due; returns the periods fired
    pub fn fire_due<E: EventSink>(&self, events: &E) -> Vec<EngagementPeriod> {
        let now = self.clock.utc_now();
        let due: Vec<EngagementPeriod> = {
            let mut last_fired = self.last_fired.lock().unwrap_or_else(|e| e.into_inner());
            EngagementPeriod::ALL
                .into_iter()
                .filter(|period| {
                    let due = match last_fired.get(period) {
                        Some(last) => (now - *last).num_days() >= period.days(),
                        None => true,
                    };
                    if due {
                        last_fired.insert(*period, now);
                    }
                    due
                })
                .collect()
        };

        for period in &due {
            events.fire(Event::Engagement { period: *period });
        }
        due
    }
}

#[cfg(test)]
#[path = "engagement_tests.rs"]
mod tests;
