// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of one accepted run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates unique batch identifiers
pub trait BatchIdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> BatchId;
}

/// UUID-based generator for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidBatchIdGen;

impl BatchIdGen for UuidBatchIdGen {
    fn next(&self) -> BatchId {
        BatchId(uuid::Uuid::new_v4().to_string())
    }
}

/// Sequential generator for testing
#[derive(Clone, Debug)]
pub struct SequentialBatchIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialBatchIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialBatchIdGen {
    fn default() -> Self {
        Self::new("batch")
    }
}

impl BatchIdGen for SequentialBatchIdGen {
    fn next(&self) -> BatchId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        BatchId(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
