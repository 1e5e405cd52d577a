//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::future::Future;
use std::path::PathBuf;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use fleetboot_common::{HostResponse, ResponseStatus};

use crate::domain::{BootstrapConfig, BootstrapOptions, SshConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Tagged outcome of one remote execution.
pub type WorkerMessage = (ResponseStatus, HostResponse);

// ── Host Context Port ─────────────────────────────────────────────────────────

/// Produces the literal command to execute on a host.
pub trait HostContext {
    /// Render the bootstrap command for `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if required options are missing or the template
    /// cannot be rendered. No dispatch happens after such a failure.
    fn render(&self, host: &str, options: &BootstrapOptions) -> Result<String>;
}

// ── Remote Execution Ports ────────────────────────────────────────────────────

/// A set of workers able to run independent commands concurrently.
///
/// A pool of one is the single-worker case; callers never branch on size.
/// Futures are `Send` so each run can be spawned onto its own task.
pub trait WorkerPool: Send + Sync + 'static {
    /// Number of workers the pool was acquired with.
    fn size(&self) -> usize;

    /// Execute `command` on `host`.
    ///
    /// Host-level failures (refused connection, non-zero exit, timeout) are
    /// reported as `Ok((ResponseStatus::Error, _))`. `Err` means the worker
    /// itself could not honour the contract.
    fn run(&self, host: &str, command: &str) -> impl Future<Output = Result<WorkerMessage>> + Send;

    /// Release every worker and underlying connection. Infallible: failures
    /// are logged by the implementation.
    fn terminate(&self) -> impl Future<Output = ()> + Send;
}

/// Stands up a `WorkerPool` for one bootstrap run.
pub trait WorkerPoolFactory {
    type Pool: WorkerPool;

    /// Acquire a pool with exactly `size` workers sharing `ssh`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created. Anything created
    /// before the failure must already be released.
    fn acquire(
        &self,
        size: usize,
        ssh: Arc<SshConfig>,
    ) -> impl Future<Output = Result<Self::Pool>> + Send;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner: Send + Sync {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    fn run(&self, program: &str, args: &[&str]) -> impl Future<Output = Result<Output>> + Send;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<Output>> + Send;
    /// Run a program with extra environment variables.
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> impl Future<Output = Result<Output>> + Send;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the bootstrap defaults file.
pub trait ConfigStore {
    /// Load the config file, returning defaults if it does not exist.
    fn load(&self) -> Result<BootstrapConfig>;
    /// Location of the config file.
    fn path(&self) -> Result<PathBuf>;
}
