// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink that writes telemetry into the log

use super::EventSink;
use ul_core::Event;

/// Renders each event as one record under the `telemetry` target
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn fire(&self, event: Event) {
        let name = event.name();
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(target: "telemetry", event = name, %payload),
            Err(e) => tracing::warn!(target: "telemetry", event = name, error = %e, "unserializable event"),
        }
    }
}
