//! Config file specs

use crate::prelude::*;

#[test]
fn missing_config_file_is_reported() {
    let temp = Project::empty();

    temp.bare_uld()
        .args(&["--once", "immediate"])
        .fails()
        .stderr_has("failed to read config uld.toml");
}

#[test]
fn default_config_file_is_read_from_working_directory() {
    let temp = Project::with_runner("echo 0", "true", false);

    temp.bare_uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_eq(CLEAN_SUMMARY);
}

#[test]
fn unknown_setting_is_rejected() {
    let temp = Project::empty();
    temp.config("[agent]\nentitle = true\n");

    temp.uld()
        .args(&["--once", "immediate"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn paths_resolve_against_the_config_directory() {
    let temp = Project::empty();
    temp.file("data/state.json", TWO_BROKER_STATE);
    temp.config(
        "[paths]\nstate_file = \"data/state.json\"\nlog_file = \"logs/agent.log\"\n\n\
         [execution]\ninterval_between_same_broker_operations = \"0s\"\n\n\
         [runner]\nscan = \"echo lots\"\n",
    );

    temp.uld()
        .args(&["--once", "immediate"])
        .passes()
        .stdout_has("operation errors: 2");

    assert!(temp.read("logs/agent.log").contains("--- uld: starting (pid: "));
}
