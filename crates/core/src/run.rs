// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run kinds and run priorities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which steps a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Scan,
    OptOut,
    All,
    ManualScan,
}

impl RunKind {
    pub fn runs_scans(self) -> bool {
        matches!(self, RunKind::Scan | RunKind::ManualScan | RunKind::All)
    }

    pub fn runs_opt_outs(self) -> bool {
        matches!(self, RunKind::OptOut | RunKind::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Scan => "scan",
            RunKind::OptOut => "opt_out",
            RunKind::All => "all",
            RunKind::ManualScan => "manual_scan",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run was requested, and therefore what it may preempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPriority {
    /// User-triggered; preempts whatever is running
    Immediate,
    /// Timer or lifecycle triggered; never preempts
    Scheduled,
}

impl RunPriority {
    /// Whether a request at this priority is accepted while `active` runs.
    ///
    /// An idle queue accepts anything, and an immediate request replaces
    /// any active run. A scheduled request is declined whenever a run is
    /// active, including another scheduled one.
    pub fn can_replace(self, active: Option<RunPriority>) -> bool {
        match (active, self) {
            (None, _) => true,
            (Some(_), RunPriority::Immediate) => true,
            (Some(_), RunPriority::Scheduled) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunPriority::Immediate => "immediate",
            RunPriority::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for RunPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
