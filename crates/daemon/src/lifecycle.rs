// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};
use ul_adapters::{
    DesktopNotifier, ShellRunnerFactory, StaticEntitlement, TracedNotifyAdapter,
    TracedRepository, TracedRunnerFactory, TracingEventSink,
};
use ul_core::{SystemClock, UuidBatchIdGen};
use ul_engine::{AgentManager, BrokerUpdater, DefinitionUpdater, ExecutionDeps};
use ul_storage::JsonRepository;

use crate::config::{ConfigError, DaemonConfig};

/// Agent with concrete adapter types (wrapped with tracing)
pub type DaemonAgent = AgentManager<
    TracedRepository<JsonRepository>,
    TracedRunnerFactory<ShellRunnerFactory>,
    TracingEventSink,
    TracedNotifyAdapter<DesktopNotifier>,
    StaticEntitlement,
    SystemClock,
    UuidBatchIdGen,
>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: DaemonConfig,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub agent: DaemonAgent,
}

impl DaemonState {
    /// Stop the periodic trigger and remove the PID file
    pub fn shutdown(&self) {
        info!("shutting down agent");
        self.agent.shutdown();

        if self.config.paths.lock_file.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.paths.lock_file) {
                warn!(error = %e, "failed to remove PID file");
            }
        }
        info!("agent shutdown complete");
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Log path has no parent directory")]
    NoLogDir,

    #[error("Failed to acquire lock: agent already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the agent: take the lock and wire production adapters
pub fn startup(config: &DaemonConfig) -> Result<DaemonState, LifecycleError> {
    let lock_file = acquire_lock(config)?;
    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        agent: build_agent(config),
    })
}

fn acquire_lock(config: &DaemonConfig) -> Result<File, LifecycleError> {
    let lock_path = &config.paths.lock_file;
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Truncated only once the lock is held
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

/// Wire the agent over the configured state file, definitions and shell runner
pub fn build_agent(config: &DaemonConfig) -> DaemonAgent {
    let repository = JsonRepository::new(&config.paths.state_file).with_definitions(
        &config.paths.brokers_dir,
        config.agent.include_fake_brokers,
    );
    let events = TracingEventSink::new();
    let updater: Arc<dyn DefinitionUpdater> = Arc::new(BrokerUpdater::new(
        repository.clone(),
        events.clone(),
        config.agent.app_version.clone(),
    ));

    let deps = ExecutionDeps {
        repository: TracedRepository::new(repository),
        config: config.execution_config(),
        runner_factory: TracedRunnerFactory::new(ShellRunnerFactory::new(
            config.runner.clone().into(),
        )),
        events,
        notify: TracedNotifyAdapter::new(DesktopNotifier::default()),
    };

    AgentManager::new(
        deps,
        StaticEntitlement(config.agent.entitled),
        SystemClock,
        UuidBatchIdGen,
        Some(updater),
    )
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
