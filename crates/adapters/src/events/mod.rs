// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry event sinks

mod tracing_sink;

pub use tracing_sink::TracingEventSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEventSink;

use ul_core::Event;

/// Fire-and-forget telemetry
///
/// Implementations must not block: the scheduler fires events from inside
/// broker collections and mode transitions.
pub trait EventSink: Clone + Send + Sync + 'static {
    fn fire(&self, event: Event);
}

/// Sink that drops every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn fire(&self, _event: Event) {}
}
