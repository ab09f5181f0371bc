// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use std::time::Duration;
use ul_adapters::{
    sample_query, FakeEventSink, FakeNotifyAdapter, FakeRepository, FakeRunnerFactory,
    NotifyCall, RepoError, RunnerCall, StaticEntitlement,
};
use ul_core::{
    BrokerProfileQuery, ExecutionConfig, FakeClock, MatchCount, OptOutJobData,
    SequentialBatchIdGen,
};
use yare::parameterized;

type Agent = AgentManager<
    FakeRepository,
    FakeRunnerFactory,
    FakeEventSink,
    FakeNotifyAdapter,
    StaticEntitlement,
    FakeClock,
    SequentialBatchIdGen,
>;

struct Fixture {
    agent: Agent,
    repo: FakeRepository,
    factory: FakeRunnerFactory,
    events: FakeEventSink,
    notify: FakeNotifyAdapter,
}

/// Due for scheduled runs, with one pending opt-out
fn query(broker: i64, pq: i64) -> BrokerProfileQuery {
    let date = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single();
    let mut query = sample_query(broker, pq);
    query.scan_job.preferred_run_date = date;
    query.opt_out_jobs.push(OptOutJobData {
        broker_id: query.scan_job.broker_id,
        profile_query_id: query.scan_job.profile_query_id,
        extracted_profile_id: broker * 100 + pq,
        preferred_run_date: date,
        last_run_date: None,
        attempt_count: 0,
        removed: false,
    });
    query
}

fn fixture(queries: Vec<BrokerProfileQuery>, entitled: bool) -> Fixture {
    let repo = FakeRepository::with_queries(queries);
    let factory = FakeRunnerFactory::new();
    let events = FakeEventSink::new();
    let notify = FakeNotifyAdapter::new();
    let deps = ExecutionDeps {
        repository: repo.clone(),
        config: ExecutionConfig::default(),
        runner_factory: factory.clone(),
        events: events.clone(),
        notify: notify.clone(),
    };
    let clock = FakeClock::at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    Fixture {
        agent: AgentManager::new(
            deps,
            StaticEntitlement(entitled),
            clock,
            SequentialBatchIdGen::new("batch"),
            None,
        ),
        repo,
        factory,
        events,
        notify,
    }
}

fn opt_outs(factory: &FakeRunnerFactory) -> usize {
    factory
        .calls()
        .iter()
        .filter(|c| matches!(c, RunnerCall::OptOut { .. }))
        .count()
}

async fn settle() {
    tokio::time::sleep(Duration::from_secs(30)).await;
}

#[parameterized(
    entitled = { true, RunKind::All },
    not_entitled = { false, RunKind::Scan },
)]
fn scheduled_kind_follows_entitlement(entitled: bool, kind: RunKind) {
    assert_eq!(fixture(vec![], entitled).agent.scheduled_kind(), kind);
}

#[parameterized(
    no_errors = { None, RunOutcome::Finished { operation_errors: 0 } },
    interrupted = {
        Some(ErrorCollection::interrupted()),
        RunOutcome::Interrupted { operation_errors: 0 }
    },
    cannot_interrupt = {
        Some(ErrorCollection::one_time(QueueError::CannotInterrupt)),
        RunOutcome::Blocked
    },
    fetch = {
        Some(ErrorCollection::one_time(BatchError::Fetch("x".into()))),
        RunOutcome::Failed { error: BatchError::Fetch("x".into()), operation_errors: 0 }
    },
)]
fn classify_accepted_runs(errors: Option<ErrorCollection>, expected: RunOutcome) {
    let accepted = Admission::Accepted {
        batch_id: ul_core::BatchId("b".into()),
    };
    assert_eq!(RunOutcome::classify(&accepted, errors.as_ref()), expected);
}

#[test]
fn rejected_admission_is_blocked() {
    assert_eq!(
        RunOutcome::classify(&Admission::Rejected, None),
        RunOutcome::Blocked
    );
}

#[tokio::test(start_paused = true)]
async fn launching_without_profile_stays_idle() {
    let f = fixture(vec![], true);

    assert!(!f.agent.agent_finished_launching().await.unwrap());
    settle().await;

    assert!(f.factory.calls().is_empty());
    assert!(f.events.events().is_empty());
    assert_eq!(f.agent.status().last_trigger_timestamp, None);
}

#[tokio::test(start_paused = true)]
async fn launching_with_profile_starts_scheduled_run_and_trigger() {
    let f = fixture(vec![query(1, 1), query(2, 1)], true);

    assert!(f.agent.agent_finished_launching().await.unwrap());
    assert!(f.events.contains(&Event::Monitoring {
        profile_queries: 1,
        brokers: 2,
    }));
    settle().await;

    assert_eq!(opt_outs(&f.factory), 2);
    assert_eq!(f.agent.running_status_string(), "idle");

    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    assert!(f.agent.status().last_trigger_timestamp.is_some());
}

#[tokio::test(start_paused = true)]
async fn profile_saved_clean_run_notifies_and_resumes_schedule() {
    let f = fixture(vec![query(1, 1)], false);

    let outcome = f.agent.profile_saved().await.unwrap();

    assert_eq!(outcome, RunOutcome::Finished { operation_errors: 0 });
    assert_eq!(
        f.notify.calls(),
        vec![NotifyCall::RequestPermission, NotifyCall::FirstScanCompleted]
    );
    assert!(f.events.contains(&Event::ImmediateScansFinishedWithoutError));
    assert_eq!(
        f.events
            .count(|e| matches!(e, Event::InitialScanTotalDuration { profile_queries: 1, .. })),
        1
    );
    settle().await;
    assert!(f.events.contains(&Event::BatchStarted {
        kind: RunKind::Scan,
        priority: RunPriority::Scheduled,
    }));
}

#[tokio::test(start_paused = true)]
async fn profile_saved_with_matches_schedules_check_in() {
    let f = fixture(vec![query(1, 1)], false);
    f.repo.set_matches(vec![MatchCount {
        broker_id: ul_core::BrokerId(1),
        profile_query_id: ul_core::ProfileQueryId(1),
        matches: 2,
    }]);

    f.agent.profile_saved().await.unwrap();

    assert!(f.notify.calls().contains(&NotifyCall::ScheduleCheckIn));
}

#[tokio::test(start_paused = true)]
async fn profile_saved_interrupted_does_not_notify_completion() {
    let f = fixture(vec![query(1, 1)], false);
    f.factory.set_step_delay(Duration::from_secs(10));

    let agent = f.agent.clone();
    let saved = tokio::spawn(async move { agent.profile_saved().await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(f.agent.start_immediate_operations(false).is_accepted());

    let outcome = saved.await.unwrap().unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted { operation_errors: 0 });
    assert!(f.events.contains(&Event::ImmediateScansInterrupted));
    assert!(!f.notify.calls().contains(&NotifyCall::FirstScanCompleted));
}

#[tokio::test(start_paused = true)]
async fn profile_saved_fetch_failure_is_reported() {
    let f = fixture(vec![query(1, 1)], false);
    f.repo.fail_fetches(RepoError::Unavailable("locked".into()));

    let outcome = f.agent.profile_saved().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Failed { error: BatchError::Fetch(_), .. }));
    assert_eq!(
        f.events
            .count(|e| matches!(e, Event::ImmediateScansFinishedWithError { .. })),
        1
    );
    assert!(!f.events.contains(&Event::ImmediateScansFinishedWithoutError));
}

#[tokio::test(start_paused = true)]
async fn app_launched_clean_run() {
    let f = fixture(vec![query(1, 1)], true);

    let outcome = f.agent.app_launched().await.unwrap();

    assert_eq!(outcome, RunOutcome::Finished { operation_errors: 0 });
    assert!(f
        .events
        .contains(&Event::AppLaunchedScheduledRunFinishedWithoutError));
    assert_eq!(opt_outs(&f.factory), 1);
}

#[tokio::test(start_paused = true)]
async fn app_launched_is_blocked_by_immediate_run() {
    let f = fixture(vec![query(1, 1)], true);
    f.factory.set_step_delay(Duration::from_secs(10));
    f.agent.start_immediate_operations(false);

    let outcome = f.agent.app_launched().await.unwrap();

    assert_eq!(outcome, RunOutcome::Blocked);
    assert!(f.events.contains(&Event::AppLaunchedScheduledRunBlocked));
    assert_eq!(f.agent.running_status_string(), "running");
}

#[tokio::test(start_paused = true)]
async fn app_launched_interrupted_by_immediate_run() {
    let f = fixture(vec![query(1, 1)], true);
    f.factory.set_step_delay(Duration::from_secs(10));

    let agent = f.agent.clone();
    let launched = tokio::spawn(async move { agent.app_launched().await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    f.agent.start_immediate_operations(true);

    let outcome = launched.await.unwrap().unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted { operation_errors: 0 });
    assert!(f.events.contains(&Event::AppLaunchedScheduledRunInterrupted));
}

#[tokio::test(start_paused = true)]
async fn app_launched_fetch_failure() {
    let f = fixture(vec![query(1, 1)], true);
    f.repo.fail_fetches(RepoError::Corrupt("bad".into()));

    f.agent.app_launched().await.unwrap();

    assert_eq!(
        f.events.count(|e| matches!(
            e,
            Event::AppLaunchedScheduledRunFinishedWithError { .. }
        )),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn run_all_opt_outs_skips_scans_and_passes_ui_flag() {
    let f = fixture(vec![query(1, 1), query(1, 2)], false);

    assert!(f.agent.run_all_opt_outs(true).is_accepted());
    settle().await;

    assert_eq!(opt_outs(&f.factory), 2);
    assert_eq!(f.factory.calls().len(), 2);
    assert_eq!(f.factory.created(), vec![RunOptions { show_ui: true }]);
}

#[tokio::test(start_paused = true)]
async fn debug_status_reflects_active_run() {
    let f = fixture(vec![query(1, 1)], false);
    f.factory.set_step_delay(Duration::from_secs(10));

    f.agent.start_scheduled_operations(false);
    assert!(f.agent.status().is_running);
    assert_eq!(f.agent.running_status_string(), "running");

    settle().await;
    assert!(!f.agent.status().is_running);
}

#[tokio::test(start_paused = true)]
async fn periodic_trigger_waits_for_the_run() {
    let f = fixture(vec![query(1, 1)], false);
    f.factory.set_step_delay(Duration::from_secs(10));
    let started = tokio::time::Instant::now();

    let outcome = f.agent.periodic_trigger().await.unwrap();

    assert_eq!(outcome, RunOutcome::Finished { operation_errors: 0 });
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(!f.agent.status().is_running);
}
