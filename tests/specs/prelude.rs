//! Shared helpers for the `uld` specs.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Once;

pub use assert_cmd::Command;

/// Two brokers, one profile query, one pending opt-out on the first broker.
/// Every job is preferred well before any plausible "now".
pub const TWO_BROKER_STATE: &str = r#"{
  "brokers": [
    { "id": 1, "name": "Acme People", "url": "acme.example", "version": "1.0.0" },
    { "id": 2, "name": "Bright Records", "url": "bright.example", "version": "1.0.0" }
  ],
  "profile_queries": [
    { "id": 1, "first_name": "Jane", "last_name": "Doe" }
  ],
  "scan_jobs": [
    { "broker_id": 1, "profile_query_id": 1, "preferred_run_date": "2026-01-01T00:00:00Z" },
    { "broker_id": 2, "profile_query_id": 1, "preferred_run_date": "2026-01-01T00:00:00Z" }
  ],
  "opt_out_jobs": [
    {
      "broker_id": 1,
      "profile_query_id": 1,
      "extracted_profile_id": 11,
      "preferred_run_date": "2026-01-01T00:00:00Z"
    }
  ]
}
"#;

pub const CLEAN_SUMMARY: &str = "one-time error: none\noperation errors: 0\n";

static BUILD: Once = Once::new();

/// Path to the `uld` binary, building it on first use.
///
/// The specs crate does not depend on the daemon package, so
/// `cargo test` alone does not produce the binary.
pub fn uld_bin() -> PathBuf {
    let path = assert_cmd::cargo::cargo_bin("uld");
    BUILD.call_once(|| {
        let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
        let status = std::process::Command::new(cargo)
            .args(["build", "--quiet", "-p", "ul-daemon", "--bin", "uld"])
            .status()
            .expect("cargo build uld");
        assert!(status.success(), "building uld failed");
    });
    path
}

/// A scratch directory holding a `uld.toml` and its data files
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Project with the two-broker state and the given runner templates
    pub fn with_runner(scan: &str, opt_out: &str, entitled: bool) -> Self {
        let project = Self::empty();
        project.use_runner(scan, opt_out, entitled);
        project
    }

    /// Write the two-broker state and a config using these templates.
    ///
    /// Same-broker spacing is zero so runs finish promptly.
    pub fn use_runner(&self, scan: &str, opt_out: &str, entitled: bool) {
        self.file("state.json", TWO_BROKER_STATE);
        self.config(&format!(
            "[execution]\ninterval_between_same_broker_operations = \"0s\"\n\n\
             [runner]\nscan = {scan:?}\nopt_out = {opt_out:?}\n\n\
             [agent]\nentitled = {entitled}\n"
        ));
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn config(&self, content: &str) {
        self.file("uld.toml", content);
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap_or_default()
    }

    /// `uld` with `--config` pointing at this project
    pub fn uld(&self) -> Cli {
        let mut cmd = Command::new(uld_bin());
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path().join("uld.toml"));
        Cli { cmd }
    }

    /// `uld` with no arguments, run from this project's directory
    pub fn bare_uld(&self) -> Cli {
        let mut cmd = Command::new(uld_bin());
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    fn output(mut self) -> Output {
        self.cmd.timeout(std::time::Duration::from_secs(60));
        self.cmd.output().unwrap()
    }

    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let output = self.output();
        assert!(
            !output.status.success(),
            "expected failure\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected));
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(needle),
            "stdout missing {needle:?}:\n{stdout}"
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(needle),
            "stderr missing {needle:?}:\n{stderr}"
        );
        self
    }
}
