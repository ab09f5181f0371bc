// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ul_adapters::{FakeEventSink, FakeRepository, RepoCall};
use yare::parameterized;

fn count(broker: i64, pq: i64, matches: u32) -> MatchCount {
    MatchCount {
        broker_id: BrokerId(broker),
        profile_query_id: ProfileQueryId(pq),
        matches,
    }
}

#[parameterized(
    equal = { 3, 3, false },
    more_observed = { 1, 4, true },
    fewer_observed = { 4, 0, true },
)]
fn compare_flags_differences(recorded: u32, observed: u32, differs: bool) {
    let deltas = compare(&[count(1, 1, recorded)], &[count(1, 1, observed)]);
    assert_eq!(!deltas.is_empty(), differs);
}

#[test]
fn missing_record_counts_as_zero() {
    let deltas = compare(&[], &[count(2, 5, 0), count(2, 6, 3)]);
    assert_eq!(
        deltas,
        vec![MatchDelta {
            broker_id: BrokerId(2),
            profile_query_id: ProfileQueryId(6),
            recorded: 0,
            observed: 3,
        }]
    );
}

#[test]
fn unobserved_records_are_ignored() {
    assert!(compare(&[count(1, 1, 9)], &[]).is_empty());
}

#[tokio::test]
async fn reconcile_fires_one_event_per_delta() {
    let repo = FakeRepository::new();
    repo.set_matches(vec![count(1, 1, 2), count(1, 2, 0)]);
    let events = FakeEventSink::new();

    let deltas = reconcile(&repo, &events, &[count(1, 1, 2), count(1, 2, 1)]).await;

    assert_eq!(deltas.len(), 1);
    assert_eq!(
        events.events(),
        vec![Event::MatchMismatch {
            broker_id: BrokerId(1),
            profile_query_id: ProfileQueryId(2),
            recorded: 0,
            observed: 1,
        }]
    );
    assert_eq!(repo.calls(), vec![RepoCall::FetchRecordedMatches]);
}
