// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command job runner
//!
//! Each step runs a configured `sh -c` template. Placeholders expand to
//! quoted environment variable references, so broker and profile values
//! never reach the shell parser:
//!
//! | placeholder | variable |
//! |---|---|
//! | `{broker}` | `UL_BROKER` |
//! | `{broker_url}` | `UL_BROKER_URL` |
//! | `{profile_query}` | `UL_PROFILE_QUERY` |
//! | `{profile_query_id}` | `UL_PROFILE_QUERY_ID` |
//! | `{extracted_profile_id}` | `UL_EXTRACTED_PROFILE_ID` (opt-out only) |
//!
//! A scan prints its match count as the last line of stdout. A failing
//! command may report a typed failure as the last line of stderr:
//! `http <code>` or `action <id> <message>`.

use super::{JobRunner, JobRunnerFactory, RunOptions, ScanOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use ul_core::{BrokerProfileQuery, OptOutJobData, RunnerError};

/// Command templates for the two step kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommands {
    pub scan: String,
    pub opt_out: String,
}

#[derive(Clone, Debug)]
pub struct ShellRunnerFactory {
    commands: Arc<ShellCommands>,
}

impl ShellRunnerFactory {
    pub fn new(commands: ShellCommands) -> Self {
        Self {
            commands: Arc::new(commands),
        }
    }
}

impl JobRunnerFactory for ShellRunnerFactory {
    type Runner = ShellJobRunner;

    fn runner(&self, options: RunOptions) -> ShellJobRunner {
        ShellJobRunner {
            commands: Arc::clone(&self.commands),
            options,
        }
    }
}

/// Runs steps as shell commands
#[derive(Clone, Debug)]
pub struct ShellJobRunner {
    commands: Arc<ShellCommands>,
    options: RunOptions,
}

const PLACEHOLDERS: [(&str, &str); 5] = [
    ("{broker}", "\"$UL_BROKER\""),
    ("{broker_url}", "\"$UL_BROKER_URL\""),
    ("{profile_query}", "\"$UL_PROFILE_QUERY\""),
    ("{profile_query_id}", "\"$UL_PROFILE_QUERY_ID\""),
    ("{extracted_profile_id}", "\"$UL_EXTRACTED_PROFILE_ID\""),
];

pub(crate) fn render(template: &str) -> String {
    PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn query_env(query: &BrokerProfileQuery) -> Vec<(&'static str, String)> {
    vec![
        ("UL_BROKER", query.broker.name.clone()),
        ("UL_BROKER_URL", query.broker.url.clone()),
        ("UL_PROFILE_QUERY", query.profile_query.full_name()),
        ("UL_PROFILE_QUERY_ID", query.profile_query.id.to_string()),
    ]
}

/// Map a failing command's stderr onto a typed runner error
pub(crate) fn classify_failure(exit_code: i32, stderr: &str) -> RunnerError {
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty());
    if let Some(line) = last {
        let mut parts = line.trim().splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("http"), Some(code), None) => {
                if let Ok(code) = code.parse() {
                    return RunnerError::Http { code };
                }
            }
            (Some("action"), Some(id), message) => {
                return RunnerError::ActionFailed {
                    action_id: id.to_string(),
                    message: message.unwrap_or_default().to_string(),
                };
            }
            _ => {}
        }
    }
    RunnerError::CommandFailed {
        exit_code,
        stderr: stderr.trim().to_string(),
    }
}

pub(crate) fn parse_match_count(stdout: &str) -> Result<u32, RunnerError> {
    let last = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim();
    last.parse()
        .map_err(|_| RunnerError::Other(format!("scan printed no match count: {last:?}")))
}

impl ShellJobRunner {
    async fn run(&self, template: &str, env: Vec<(&'static str, String)>) -> Result<String, RunnerError> {
        let command = render(template);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .envs(env)
            .env("UL_SHOW_UI", if self.options.show_ui { "1" } else { "0" })
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RunnerError::Other(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            tracing::debug!(stderr = %stderr, "runner stderr");
        }
        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(classify_failure(exit_code, &stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl JobRunner for ShellJobRunner {
    async fn scan(&self, query: &BrokerProfileQuery) -> Result<ScanOutcome, RunnerError> {
        let stdout = self.run(&self.commands.scan, query_env(query)).await?;
        let matches = parse_match_count(&stdout)?;
        Ok(ScanOutcome { matches })
    }

    async fn opt_out(
        &self,
        query: &BrokerProfileQuery,
        job: &OptOutJobData,
    ) -> Result<(), RunnerError> {
        let mut env = query_env(query);
        env.push(("UL_EXTRACTED_PROFILE_ID", job.extracted_profile_id.to_string()));
        self.run(&self.commands.opt_out, env).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
