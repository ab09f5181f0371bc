// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::EventSink;
use std::sync::{Arc, Mutex};
use ul_core::Event;

/// Records every fired event
#[derive(Clone, Default)]
pub struct FakeEventSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl FakeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all fired events
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of fired events matching `pred`
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.count(|e| e == event) > 0
    }
}

impl EventSink for FakeEventSink {
    fn fire(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
