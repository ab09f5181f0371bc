//! `uld --once opt-out` specs

use crate::prelude::*;

#[test]
fn runs_pending_opt_outs_without_scanning() {
    let temp = Project::empty();
    let log = temp.path().join("calls.txt");
    temp.use_runner(
        &format!("echo scan >> '{}'; echo 0", log.display()),
        &format!("echo opt-out {{broker}} {{extracted_profile_id}} >> '{}'", log.display()),
        false,
    );

    temp.uld()
        .args(&["--once", "opt-out"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);

    similar_asserts::assert_eq!(temp.read("calls.txt"), "opt-out Acme People 11\n");
}

#[test]
fn show_ui_reaches_the_runner() {
    let temp = Project::empty();
    let log = temp.path().join("ui.txt");
    temp.use_runner(
        "echo 0",
        &format!("echo \"$UL_SHOW_UI\" >> '{}'", log.display()),
        false,
    );

    temp.uld()
        .args(&["--once", "opt-out", "--show-ui"])
        .passes();

    assert_eq!(temp.read("ui.txt").trim(), "1");
}

#[test]
fn typed_runner_failure_is_reported() {
    let temp = Project::with_runner("echo 0", "echo 'action submit form rejected' >&2; exit 3", false);

    temp.uld()
        .args(&["--once", "opt-out"])
        .passes()
        .stdout_eq(
            "one-time error: none\n\
             operation errors: 1\n  \
             Acme People (1) opt-out profile 1: action submit failed: form rejected\n",
        );
}
