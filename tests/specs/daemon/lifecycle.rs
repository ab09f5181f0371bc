//! Daemon lifecycle specs
//!
//! Verify startup, the single-instance lock and the log file.

use crate::prelude::*;
use std::io::{BufRead, BufReader};
use std::process::{Child, Stdio};

/// Start `uld` in the background and wait for its READY line
fn start_daemon(temp: &Project) -> Child {
    let mut child = std::process::Command::new(uld_bin())
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(temp.path().join("uld.toml"))
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let stdout = child.stdout.take().unwrap();
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line).unwrap();
    assert_eq!(line.trim(), "READY");
    child
}

#[test]
fn daemon_writes_pid_and_reports_ready() {
    let temp = Project::empty();
    temp.config("");

    let mut daemon = start_daemon(&temp);
    let pid = temp.read("uld.pid");
    daemon.kill().unwrap();
    daemon.wait().unwrap();

    assert_eq!(pid.trim(), daemon.id().to_string());
}

#[test]
fn second_instance_is_refused_while_daemon_runs() {
    let temp = Project::with_runner("echo 0", "true", false);
    temp.file("state.json", "{}");

    let mut daemon = start_daemon(&temp);
    let second = temp.uld().args(&["--once", "immediate"]).fails();
    daemon.kill().unwrap();
    daemon.wait().unwrap();

    second.stderr_has("already running");
    assert!(temp.read("uld.log").contains("ERROR Failed to start agent"));
}

#[test]
fn log_has_startup_marker_per_attempt() {
    let temp = Project::with_runner("echo 0", "true", false);

    temp.uld().args(&["--once", "immediate"]).passes();
    temp.uld().args(&["--once", "immediate"]).passes();

    let log = temp.read("uld.log");
    assert_eq!(log.matches("--- uld: starting (pid: ").count(), 2);
    assert!(log.contains("starting uld"));
}
