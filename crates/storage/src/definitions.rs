// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundled broker definition files

use std::fs;
use std::path::Path;
use ul_adapters::BrokerStoreError;
use ul_core::Broker;

/// Prefix marking definitions that only integration runs load
pub const FAKE_PREFIX: &str = "fake";

/// Load every `*.json` broker definition in `dir`, sorted by file name.
///
/// Files named with the fake prefix are skipped unless `include_fake`.
pub fn load_definitions(dir: &Path, include_fake: bool) -> Result<Vec<Broker>, BrokerStoreError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| BrokerStoreError::Unavailable(format!("{}: {e}", dir.display())))?;

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| {
            let fake = p
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FAKE_PREFIX));
            include_fake || !fake
        })
        .collect();
    files.sort();

    files
        .iter()
        .map(|path| {
            let invalid = |message: String| BrokerStoreError::InvalidDefinition {
                file: path.display().to_string(),
                message,
            };
            let bytes = fs::read(path).map_err(|e| invalid(e.to_string()))?;
            let mut broker: Broker =
                serde_json::from_slice(&bytes).map_err(|e| invalid(e.to_string()))?;
            // ids are assigned by the store
            broker.id = None;
            Ok(broker)
        })
        .collect()
}

#[cfg(test)]
#[path = "definitions_tests.rs"]
mod tests;
