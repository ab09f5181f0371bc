// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process host for the unlist agent (`uld`)

pub mod config;
pub mod lifecycle;
pub mod once;

pub use config::{ConfigError, DaemonConfig, DEFAULT_CONFIG_FILE};
pub use lifecycle::{build_agent, startup, DaemonAgent, DaemonState, LifecycleError};
pub use once::{exit_code, render_summary, run_once, OnceMode, ParseModeError};
