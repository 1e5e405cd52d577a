//! SSH worker pool: runs bootstrap commands through the system `ssh` client.
//!
//! One permit per worker on a semaphore stands in for the pool's workers.
//! Terminating the pool closes the semaphore; a run that is still in flight
//! when its task is aborted has its `ssh` child killed on drop.

use std::process::Output;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use fleetboot_common::{HostResponse, ResponseStatus};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::application::ports::{CommandRunner, WorkerMessage, WorkerPool, WorkerPoolFactory};
use crate::domain::SshConfig;
use crate::infra::command_runner::DEFAULT_PROBE_TIMEOUT;

pub const SSH_PROGRAM: &str = "ssh";
pub const SSHPASS_PROGRAM: &str = "sshpass";

/// Build the `ssh` argument list for running `command` on `host`.
#[must_use]
pub fn ssh_args(ssh: &SshConfig, host: &str, command: &str) -> Vec<String> {
    let mut args = vec![
        "-o".to_string(),
        format!("ConnectTimeout={}", ssh.connect_timeout_secs()),
        "-o".to_string(),
        "StrictHostKeyChecking=accept-new".to_string(),
    ];
    if ssh.password.is_none() {
        args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
    }
    if let Some(keys) = &ssh.keys {
        for key in keys.paths() {
            args.extend(["-i".to_string(), key.to_string()]);
        }
    }
    args.extend([
        "-l".to_string(),
        ssh.user.clone(),
        "--".to_string(),
        host.to_string(),
        command.to_string(),
    ]);
    args
}

/// Map a finished `ssh` process to a tagged outcome.
#[must_use]
pub fn classify_output(host: &str, output: &Output) -> WorkerMessage {
    let response = HostResponse {
        host: host.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };
    let status = if output.status.success() {
        ResponseStatus::Ok
    } else {
        ResponseStatus::Error
    };
    (status, response)
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Acquires `SshWorkerPool`s after checking the ssh client is usable.
pub struct SshPoolFactory<R> {
    runner: R,
}

impl<R: CommandRunner + Clone + 'static> SshPoolFactory<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn probe(&self, program: &str) -> Result<()> {
        let output = self
            .runner
            .run_with_timeout(program, &["-V"], DEFAULT_PROBE_TIMEOUT)
            .await
            .with_context(|| format!("{program} client is not available"))?;
        // `ssh -V` exits 0; some sshpass builds print usage and exit 1.
        anyhow::ensure!(
            output.status.success() || !output.stdout.is_empty() || !output.stderr.is_empty(),
            "{program} -V failed with {}",
            output.status
        );
        Ok(())
    }
}

impl<R: CommandRunner + Clone + 'static> WorkerPoolFactory for SshPoolFactory<R> {
    type Pool = SshWorkerPool<R>;

    // Probing creates nothing that outlives a failure, so there is nothing
    // to release on the error path.
    async fn acquire(&self, size: usize, ssh: Arc<SshConfig>) -> Result<Self::Pool> {
        anyhow::ensure!(size > 0, "worker pool needs at least one worker");
        self.probe(SSH_PROGRAM).await?;
        if ssh.password.is_some() {
            self.probe(SSHPASS_PROGRAM).await?;
        }
        debug!(size, user = %ssh.user, "ssh worker pool ready");
        Ok(SshWorkerPool::new(self.runner.clone(), ssh, size))
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Fixed-size set of SSH workers sharing one connection configuration.
pub struct SshWorkerPool<R> {
    runner: R,
    ssh: Arc<SshConfig>,
    workers: Semaphore,
    size: usize,
    terminated: AtomicBool,
}

impl<R: CommandRunner> SshWorkerPool<R> {
    #[must_use]
    pub fn new(runner: R, ssh: Arc<SshConfig>, size: usize) -> Self {
        Self {
            runner,
            ssh,
            workers: Semaphore::new(size),
            size,
            terminated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    async fn exec(&self, host: &str, command: &str) -> Result<Output> {
        let args = ssh_args(&self.ssh, host, command);
        if let Some(password) = &self.ssh.password {
            let mut wrapped = vec!["-e", SSH_PROGRAM];
            wrapped.extend(args.iter().map(String::as_str));
            self.runner
                .run_with_env(SSHPASS_PROGRAM, &wrapped, &[("SSHPASS", password)])
                .await
        } else {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.runner.run(SSH_PROGRAM, &args).await
        }
    }
}

impl<R: CommandRunner + 'static> WorkerPool for SshWorkerPool<R> {
    fn size(&self) -> usize {
        self.size
    }

    async fn run(&self, host: &str, command: &str) -> Result<WorkerMessage> {
        let _worker = self
            .workers
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("worker pool already terminated"))?;

        debug!(host, "running bootstrap command over ssh");
        let message = match self.exec(host, command).await {
            Ok(output) => classify_output(host, &output),
            Err(e) => (
                ResponseStatus::Error,
                HostResponse::failed(host, format!("{e:#}")),
            ),
        };
        debug!(host, status = ?message.0, "ssh command finished");
        Ok(message)
    }

    async fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            warn!("ssh worker pool terminated more than once");
            return;
        }
        self.workers.close();
        debug!(size = self.size, "ssh worker pool closed");
    }
}
