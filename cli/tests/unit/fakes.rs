//! Scripted fakes for the bootstrap ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{ExitStatus, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use fleetboot_cli::application::ports::{
    CommandRunner, HostContext, ProgressReporter, WorkerMessage, WorkerPool, WorkerPoolFactory,
};
use fleetboot_cli::domain::{BootstrapConfig, BootstrapOptions, SshConfig};
use fleetboot_common::{HostResponse, ResponseStatus};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

pub fn output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

// ── Config ───────────────────────────────────────────────────────────────────

pub fn config_for(user: &str) -> BootstrapConfig {
    BootstrapConfig {
        ssh_user: Some(user.to_string()),
        ..BootstrapConfig::default()
    }
}

// ── Host context ─────────────────────────────────────────────────────────────

/// Renders `bootstrap <host>` and counts calls. Hosts in `failing` fail.
#[derive(Default)]
pub struct FakeHostContext {
    renders: AtomicUsize,
    failing: Vec<String>,
}

impl FakeHostContext {
    pub fn failing_on(host: &str) -> Self {
        Self {
            renders: AtomicUsize::new(0),
            failing: vec![host.to_string()],
        }
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl HostContext for FakeHostContext {
    fn render(&self, host: &str, options: &BootstrapOptions) -> Result<String> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        anyhow::ensure!(!self.failing.iter().any(|h| h == host), "template exploded");
        Ok(format!("bootstrap {host} -E {}", options.environment))
    }
}

// ── Worker pool ──────────────────────────────────────────────────────────────

/// What a fake worker does for one host.
#[derive(Clone)]
pub enum Script {
    Ok(&'static str),
    Fail(i32, &'static str),
    /// Return `Err`, breaking the ok/error contract.
    Broken(&'static str),
    Panic,
    Hang,
}

/// Everything the fakes observed, shared between factory and pool.
#[derive(Default)]
pub struct PoolLog {
    pub acquired: Mutex<Vec<usize>>,
    pub dispatched: Mutex<Vec<(String, String)>>,
    pub terminated: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl PoolLog {
    pub fn acquire_count(&self) -> usize {
        self.acquired.lock().expect("lock").len()
    }

    pub fn pool_size(&self) -> Option<usize> {
        self.acquired.lock().expect("lock").last().copied()
    }

    pub fn dispatched_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<_> = self
            .dispatched
            .lock()
            .expect("lock")
            .iter()
            .map(|(h, _)| h.clone())
            .collect();
        hosts.sort();
        hosts
    }

    pub fn command_for(&self, host: &str) -> Option<String> {
        self.dispatched
            .lock()
            .expect("lock")
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, c)| c.clone())
    }

    pub fn terminate_count(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Factory handing out `FakePool`s. Hosts without a script succeed.
#[derive(Default)]
pub struct FakePoolFactory {
    scripts: Arc<HashMap<String, Script>>,
    acquire_error: Option<&'static str>,
    pub log: Arc<PoolLog>,
}

impl FakePoolFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, host: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(host.to_string(), script);
        self
    }

    pub fn failing_acquire(reason: &'static str) -> Self {
        Self {
            acquire_error: Some(reason),
            ..Self::default()
        }
    }
}

impl WorkerPoolFactory for FakePoolFactory {
    type Pool = FakePool;

    async fn acquire(&self, size: usize, _ssh: Arc<SshConfig>) -> Result<FakePool> {
        if let Some(reason) = self.acquire_error {
            anyhow::bail!(reason);
        }
        self.log.acquired.lock().expect("lock").push(size);
        Ok(FakePool {
            size,
            scripts: Arc::clone(&self.scripts),
            log: Arc::clone(&self.log),
        })
    }
}

pub struct FakePool {
    size: usize,
    scripts: Arc<HashMap<String, Script>>,
    log: Arc<PoolLog>,
}

impl WorkerPool for FakePool {
    fn size(&self) -> usize {
        self.size
    }

    async fn run(&self, host: &str, command: &str) -> Result<WorkerMessage> {
        self.log
            .dispatched
            .lock()
            .expect("lock")
            .push((host.to_string(), command.to_string()));

        let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);

        let script = self.scripts.get(host).cloned().unwrap_or(Script::Ok("converged"));
        match script {
            Script::Ok(stdout) => Ok((
                ResponseStatus::Ok,
                HostResponse {
                    host: host.to_string(),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                },
            )),
            Script::Fail(code, stderr) => Ok((
                ResponseStatus::Error,
                HostResponse {
                    host: host.to_string(),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    exit_code: Some(code),
                },
            )),
            Script::Broken(reason) => anyhow::bail!(reason),
            Script::Panic => panic!("worker for {host} crashed"),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                anyhow::bail!("hang ended")
            }
        }
    }

    async fn terminate(&self) {
        self.log.terminated.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Reporters ────────────────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Records `kind: message` for every event.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// One recorded process invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

/// Returns scripted output per program; unknown programs fail to spawn.
#[derive(Clone, Default)]
pub struct FakeRunner {
    outputs: Arc<HashMap<String, (i32, &'static str, &'static str)>>,
    pub calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeRunner {
    pub fn with(mut self, program: &str, code: i32, stdout: &'static str, stderr: &'static str) -> Self {
        Arc::make_mut(&mut self.outputs).insert(program.to_string(), (code, stdout, stderr));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock").clone()
    }

    fn respond(&self, program: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
        self.calls.lock().expect("lock").push(Invocation {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            envs: envs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        });
        let (code, stdout, stderr) = self
            .outputs
            .get(program)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("failed to spawn {program}"))?;
        Ok(output(code, stdout, stderr))
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.respond(program, args, &[])
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        self.respond(program, args, &[])
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output> {
        self.respond(program, args, envs)
    }
}
