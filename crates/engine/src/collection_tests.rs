// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use ul_adapters::{
    sample_query, FakeEventSink, FakeJobRunner, FakeRepository, FakeRunnerFactory,
    JobRunnerFactory, RepoError, RunOptions, RunnerCall,
};
use ul_core::{Event, OptOutJobData};

const INTERVAL: Duration = Duration::from_secs(2);

fn timing() -> StepTiming {
    StepTiming {
        interval: INTERVAL,
        scan_timeout: Duration::from_secs(60),
        opt_out_timeout: Duration::from_secs(60),
    }
}

struct Harness {
    repo: FakeRepository,
    factory: FakeRunnerFactory,
    events: FakeEventSink,
    recorder: BatchRecorder,
    batch_cancel: CancellationToken,
}

impl Harness {
    fn new(queries: Vec<BrokerProfileQuery>) -> Self {
        Self {
            repo: FakeRepository::with_queries(queries),
            factory: FakeRunnerFactory::new(),
            events: FakeEventSink::new(),
            recorder: BatchRecorder::new(),
            batch_cancel: CancellationToken::new(),
        }
    }

    fn collection(
        &self,
        broker: i64,
        kind: RunKind,
        priority_date: Option<DateTime<Utc>>,
        timing: StepTiming,
    ) -> BrokerJobCollection<FakeRepository, FakeJobRunner, FakeEventSink> {
        BrokerJobCollection::new(
            BrokerId(broker),
            format!("broker-{broker}"),
            kind,
            priority_date,
            timing,
            self.repo.clone(),
            self.factory.runner(RunOptions::default()),
            self.events.clone(),
            self.recorder.clone(),
            self.batch_cancel.clone(),
        )
    }
}

fn with_opt_out(mut query: BrokerProfileQuery, extracted: i64) -> BrokerProfileQuery {
    query.opt_out_jobs.push(OptOutJobData {
        broker_id: query.scan_job.broker_id,
        profile_query_id: query.scan_job.profile_query_id,
        extracted_profile_id: extracted,
        preferred_run_date: None,
        last_run_date: None,
        attempt_count: 0,
        removed: false,
    });
    query
}

fn scan(broker: i64, pq: i64) -> RunnerCall {
    RunnerCall::Scan {
        broker_id: Some(BrokerId(broker)),
        profile_query_id: ProfileQueryId(pq),
    }
}

#[tokio::test(start_paused = true)]
async fn runs_only_its_own_broker_steps_in_order() {
    let h = Harness::new(vec![
        sample_query(1, 10),
        sample_query(2, 20),
        sample_query(1, 11),
    ]);

    h.collection(1, RunKind::Scan, None, timing())
        .execute(&CancellationToken::new())
        .await;

    assert_eq!(h.factory.calls(), vec![scan(1, 10), scan(1, 11)]);
    assert!(h.recorder.take_errors().is_empty());
    assert_eq!(h.recorder.take_observed().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn pauses_between_successive_steps() {
    let h = Harness::new(vec![
        sample_query(1, 10),
        sample_query(1, 11),
        sample_query(1, 12),
    ]);
    h.factory.set_step_delay(Duration::from_millis(500));

    h.collection(1, RunKind::Scan, None, timing())
        .execute(&CancellationToken::new())
        .await;

    let starts: Vec<_> = h.factory.timed_calls().into_iter().map(|(t, _)| t).collect();
    assert_eq!(starts.len(), 3);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= INTERVAL + Duration::from_millis(500));
    }
}

#[tokio::test(start_paused = true)]
async fn scans_run_before_opt_outs_for_all() {
    let h = Harness::new(vec![with_opt_out(sample_query(1, 10), 99)]);

    h.collection(1, RunKind::All, None, timing())
        .execute(&CancellationToken::new())
        .await;

    assert_eq!(
        h.factory.calls(),
        vec![
            scan(1, 10),
            RunnerCall::OptOut {
                broker_id: Some(BrokerId(1)),
                profile_query_id: ProfileQueryId(10),
                extracted_profile_id: 99,
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn opt_out_kind_skips_scans() {
    let h = Harness::new(vec![with_opt_out(sample_query(1, 10), 5)]);

    h.collection(1, RunKind::OptOut, None, timing())
        .execute(&CancellationToken::new())
        .await;

    let calls = h.factory.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], RunnerCall::OptOut { .. }));
}

#[tokio::test(start_paused = true)]
async fn priority_date_filters_future_jobs() {
    let cutoff = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).single();
    let mut later = sample_query(1, 11);
    later.scan_job.preferred_run_date = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).single();
    let mut earlier = sample_query(1, 10);
    earlier.scan_job.preferred_run_date = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).single();
    let h = Harness::new(vec![later, earlier]);

    h.collection(1, RunKind::Scan, cutoff, timing())
        .execute(&CancellationToken::new())
        .await;

    assert_eq!(h.factory.calls(), vec![scan(1, 10)]);
}

#[tokio::test(start_paused = true)]
async fn failing_step_is_recorded_and_next_step_runs() {
    let h = Harness::new(vec![sample_query(1, 10), sample_query(1, 11)]);
    h.factory
        .fail_scan(BrokerId(1), ProfileQueryId(10), RunnerError::Http { code: 503 });

    h.collection(1, RunKind::Scan, None, timing())
        .execute(&CancellationToken::new())
        .await;

    assert_eq!(h.factory.calls(), vec![scan(1, 10), scan(1, 11)]);
    let errors = h.recorder.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].step, StepKind::Scan);
    assert_eq!(errors[0].profile_query_id, Some(ProfileQueryId(10)));
    assert!(h.events.contains(&Event::HttpError {
        broker: "broker-1".to_string(),
        code: 503,
    }));
}

#[tokio::test(start_paused = true)]
async fn slow_step_times_out() {
    let h = Harness::new(vec![sample_query(1, 10)]);
    h.factory.set_step_delay(Duration::from_secs(120));
    let short = StepTiming {
        scan_timeout: Duration::from_secs(5),
        ..timing()
    };

    h.collection(1, RunKind::Scan, None, short)
        .execute(&CancellationToken::new())
        .await;

    let errors = h.recorder.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, RunnerError::Timeout(Duration::from_secs(5)));
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_is_recorded_per_broker() {
    let h = Harness::new(vec![sample_query(1, 10)]);
    h.repo.fail_fetches(RepoError::Unavailable("locked".into()));

    h.collection(1, RunKind::Scan, None, timing())
        .execute(&CancellationToken::new())
        .await;

    assert!(h.factory.calls().is_empty());
    let errors = h.recorder.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].step, StepKind::Fetch);
    assert_eq!(errors[0].profile_query_id, None);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_does_nothing() {
    let h = Harness::new(vec![sample_query(1, 10)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    h.collection(1, RunKind::Scan, None, timing())
        .execute(&cancel)
        .await;

    assert!(h.factory.calls().is_empty());
    assert!(h.repo.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn batch_cancel_during_pause_stops_quietly() {
    let h = Harness::new(vec![sample_query(1, 10), sample_query(1, 11)]);
    let collection = h.collection(1, RunKind::Scan, None, timing());
    let batch_cancel = h.batch_cancel.clone();

    let run = tokio::spawn(async move { collection.execute(&CancellationToken::new()).await });
    tokio::time::sleep(INTERVAL / 2).await;
    batch_cancel.cancel();
    let _ = run.await;

    assert_eq!(h.factory.calls(), vec![scan(1, 10)]);
    assert!(h.recorder.take_errors().is_empty());
}
