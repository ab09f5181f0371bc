//! `uld --once immediate` specs
//!
//! A manual scan of every broker, opt-outs untouched.

use crate::prelude::*;

#[test]
fn clean_run_prints_empty_summary() {
    let temp = Project::with_runner("echo 0", "exit 1", false);

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);
}

#[test]
fn scans_every_broker_and_no_opt_outs() {
    let temp = Project::empty();
    let log = temp.path().join("calls.txt");
    temp.use_runner(
        &format!("echo scan {{broker}} >> '{}'; echo 0", log.display()),
        &format!("echo opt-out >> '{}'", log.display()),
        true,
    );

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    let mut calls: Vec<String> = temp.read("calls.txt").lines().map(String::from).collect();
    calls.sort();
    similar_asserts::assert_eq!(calls, vec!["scan Acme People", "scan Bright Records"]);
}

#[test]
fn broker_failure_is_isolated_and_listed() {
    let temp = Project::with_runner(
        r#"if [ {broker} = "Acme People" ]; then echo "http 503" >&2; exit 1; fi; echo 1"#,
        "true",
        false,
    );

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_eq(
            "one-time error: none\n\
             operation errors: 1\n  \
             Acme People (1) scan profile 1: http error 503\n",
        );
}

#[test]
fn definitions_are_loaded_before_the_batch() {
    let temp = Project::empty();
    temp.file(
        "state.json",
        r#"{ "profile_queries": [ { "id": 1, "first_name": "Jane", "last_name": "Doe" } ] }"#,
    );
    temp.file(
        "brokers/acme.json",
        r#"{ "name": "Acme People", "url": "acme.example", "version": "1.0.0" }"#,
    );
    let scans = temp.path().join("scans.txt");
    temp.config(&format!(
        "[execution]\ninterval_between_same_broker_operations = \"0s\"\n\n\
         [runner]\nscan = \"echo {{broker}} >> '{}'; echo 0\"\n",
        scans.display()
    ));

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    assert_eq!(temp.read("scans.txt").trim(), "Acme People");
    assert!(temp.read("state.json").contains("acme.example"));
}
