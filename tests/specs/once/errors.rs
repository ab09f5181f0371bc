//! Batch-level failures in `--once` mode

use crate::prelude::*;

#[test]
fn unreadable_state_fails_the_batch() {
    let temp = Project::with_runner("echo 0", "true", true);
    temp.file("state.json", "{ not json");

    temp.uld()
        .args(&["--once", "immediate"])
        .fails()
        .code(1)
        .stdout_has("one-time error: failed to fetch profile queries")
        .stdout_has("operation errors: 0");
}

#[test]
fn unknown_mode_is_a_usage_error() {
    let temp = Project::with_runner("echo 0", "true", false);

    temp.uld()
        .args(&["--once", "sometimes"])
        .fails()
        .code(2)
        .stderr_has("unknown run mode \"sometimes\"")
        .stderr_has("usage: uld");
}

#[test]
fn malformed_scan_output_is_a_broker_error() {
    let temp = Project::with_runner("echo lots", "true", false);

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_has("operation errors: 2")
        .stdout_has("Acme People (1) scan profile 1: scan printed no match count: \"lots\"")
        .stdout_has("Bright Records (2) scan profile 1: scan printed no match count: \"lots\"");
}
