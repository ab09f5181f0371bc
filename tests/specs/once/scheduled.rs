//! `uld --once scheduled` specs
//!
//! Scheduled runs scan everyone; opt-outs only run for entitled users.

use crate::prelude::*;

fn recording_project(entitled: bool) -> Project {
    let temp = Project::empty();
    let log = temp.path().join("calls.txt");
    temp.use_runner(
        &format!("echo scan >> '{}'; echo 0", log.display()),
        &format!("echo opt-out {{extracted_profile_id}} >> '{}'", log.display()),
        entitled,
    );
    temp
}

fn calls(temp: &Project, prefix: &str) -> usize {
    temp.read("calls.txt")
        .lines()
        .filter(|l| l.starts_with(prefix))
        .count()
}

#[test]
fn entitled_run_scans_and_opts_out() {
    let temp = recording_project(true);

    temp.uld()
        .args(&["--once", "scheduled"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    assert_eq!(calls(&temp, "scan"), 2);
    assert!(temp.read("calls.txt").contains("opt-out 11"));
}

#[test]
fn unentitled_run_only_scans() {
    let temp = recording_project(false);

    temp.uld()
        .args(&["--once", "scheduled"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    assert_eq!(calls(&temp, "scan"), 2);
    assert_eq!(calls(&temp, "opt-out"), 0);
}

#[test]
fn jobs_without_a_preferred_date_are_not_due() {
    let temp = Project::empty();
    temp.file(
        "state.json",
        r#"{
          "brokers": [ { "id": 1, "name": "Acme People", "url": "acme.example", "version": "1.0.0" } ],
          "profile_queries": [ { "id": 1, "first_name": "Jane", "last_name": "Doe" } ],
          "scan_jobs": [ { "broker_id": 1, "profile_query_id": 1 } ]
        }"#,
    );
    let log = temp.path().join("calls.txt");
    temp.config(&format!(
        "[runner]\nscan = \"echo scan >> '{}'; echo 0\"\n",
        log.display()
    ));

    temp.uld()
        .args(&["--once", "scheduled"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    assert_eq!(temp.read("calls.txt"), "");
}
