// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-run comparison of recorded and observed match counts

use std::collections::HashMap;
use ul_adapters::{EventSink, Repository};
use ul_core::{BrokerId, Event, MatchCount, ProfileQueryId};

/// A (broker, profile query) whose observed count differs from the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDelta {
    pub broker_id: BrokerId,
    pub profile_query_id: ProfileQueryId,
    pub recorded: u32,
    pub observed: u32,
}

/// Every observed count that disagrees with its recorded one
///
/// A pair with no record counts as zero recorded matches. Output follows
/// the order of `observed`.
pub fn compare(recorded: &[MatchCount], observed: &[MatchCount]) -> Vec<MatchDelta> {
    let known: HashMap<(BrokerId, ProfileQueryId), u32> = recorded
        .iter()
        .map(|m| ((m.broker_id, m.profile_query_id), m.matches))
        .collect();

    observed
        .iter()
        .filter_map(|m| {
            let recorded = known
                .get(&(m.broker_id, m.profile_query_id))
                .copied()
                .unwrap_or(0);
            (recorded != m.matches).then_some(MatchDelta {
                broker_id: m.broker_id,
                profile_query_id: m.profile_query_id,
                recorded,
                observed: m.matches,
            })
        })
        .collect()
}

/// Fire a mismatch event per delta; a repository failure is only logged
pub async fn reconcile<R: Repository, E: EventSink>(
    repository: &R,
    events: &E,
    observed: &[MatchCount],
) -> Vec<MatchDelta> {
    let recorded = match repository.fetch_recorded_matches().await {
        Ok(recorded) => recorded,
        Err(e) => {
            tracing::warn!(error = %e, "skipping match reconciliation");
            return Vec::new();
        }
    };

    let deltas = compare(&recorded, observed);
    for d in &deltas {
        events.fire(Event::MatchMismatch {
            broker_id: d.broker_id,
            profile_query_id: d.profile_query_id,
            recorded: d.recorded,
            observed: d.observed,
        });
    }
    tracing::info!(
        observed = observed.len(),
        mismatches = deltas.len(),
        "match reconciliation finished"
    );
    deltas
}

#[cfg(test)]
#[path = "mismatch_tests.rs"]
mod tests;
