//! Application service: concurrent bootstrap of a host list.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! ```text
//! acquire pool(N) ─┬─ run(host_1) ─┐
//!                  ├─ run(host_2) ─┼─ barrier ─ classify ─ terminate pool
//!                  └─ run(host_N) ─┘
//! ```
//!
//! Per-host failures are data (the error bucket of the `ResponseSet`); only
//! configuration, pool acquisition, contract violations and an expired
//! deadline fail the run itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fleetboot_common::ResponseSet;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::application::ports::{
    HostContext, ProgressReporter, WorkerMessage, WorkerPool, WorkerPoolFactory,
};
use crate::domain::{BootstrapConfig, BootstrapError, DispatchRequest, SshConfig, normalize_hosts};

type Resolution = Result<(Id, Result<WorkerMessage>), JoinError>;

/// Coordinates one bootstrap operation over a fixed set of hosts.
#[derive(Debug)]
pub struct Bootstrapper {
    ssh: Arc<SshConfig>,
    requests: Vec<DispatchRequest>,
    deadline: Option<Duration>,
}

impl Bootstrapper {
    /// Validate `config` and render one dispatch request per unique host.
    ///
    /// # Errors
    ///
    /// Returns `MissingSshUser` before anything is rendered if no user is
    /// configured, or the host context's error if a command cannot be
    /// rendered.
    pub fn new<I, T>(hosts: I, config: &BootstrapConfig, context: &impl HostContext) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let ssh = config.ssh_config()?;

        let requests = normalize_hosts(hosts)
            .into_iter()
            .map(|host| {
                let command = context
                    .render(&host, &config.options)
                    .with_context(|| format!("rendering bootstrap command for {host}"))?;
                Ok(DispatchRequest::new(host, command))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ssh: Arc::new(ssh),
            requests,
            deadline: None,
        })
    }

    /// Bound the fan-in wait. When it expires, outstanding runs are aborted,
    /// the pool is still terminated and `run` fails with `DeadlineExceeded`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Unique hosts, in dispatch order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.requests.iter().map(DispatchRequest::host)
    }

    #[must_use]
    pub fn requests(&self) -> &[DispatchRequest] {
        &self.requests
    }

    #[must_use]
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh
    }

    /// Dispatch every request concurrently and classify the outcomes.
    ///
    /// The pool is terminated exactly once on every path after it was
    /// acquired.
    ///
    /// # Errors
    ///
    /// Returns `PoolAcquisition` if the pool cannot be created,
    /// `ContractViolation` if a worker fails outside the ok/error contract,
    /// or `DeadlineExceeded` if an opt-in deadline expires.
    pub async fn run(
        &self,
        factory: &impl WorkerPoolFactory,
        reporter: &impl ProgressReporter,
    ) -> Result<ResponseSet> {
        let total = self.requests.len();
        if total == 0 {
            debug!("no hosts to bootstrap");
            return Ok(ResponseSet::new());
        }

        reporter.step(&format!("bootstrapping {total} host(s)..."));
        let pool = factory
            .acquire(total, Arc::clone(&self.ssh))
            .await
            .map_err(|e| BootstrapError::PoolAcquisition(format!("{e:#}")))?;
        let pool = Arc::new(pool);
        debug!(size = pool.size(), "worker pool acquired");

        let outcome = self.dispatch(&pool).await;

        pool.terminate().await;
        debug!("worker pool terminated");

        let responses = outcome?;
        info!(
            total,
            ok = responses.oks().len(),
            error = responses.errors().len(),
            "bootstrap finished"
        );
        if responses.has_errors() {
            reporter.warn(&format!(
                "{} of {total} host(s) failed to bootstrap",
                responses.errors().len()
            ));
        } else {
            reporter.success(&format!("{total} host(s) bootstrapped"));
        }
        Ok(responses)
    }

    /// Fan out, wait for every run, then classify in resolution order.
    async fn dispatch<P: WorkerPool>(&self, pool: &Arc<P>) -> Result<ResponseSet, BootstrapError> {
        let mut join_set = JoinSet::new();
        let mut hosts_by_task = HashMap::with_capacity(self.requests.len());

        for request in &self.requests {
            let pool = Arc::clone(pool);
            let host = request.host().to_string();
            let command = request.command().to_string();
            debug!(host = %host, "dispatching bootstrap command");
            let handle = join_set.spawn(async move { pool.run(&host, &command).await });
            hosts_by_task.insert(handle.id(), request.host().to_string());
        }

        let resolutions = match self.deadline {
            None => drain(&mut join_set).await,
            Some(limit) => {
                let timed = tokio::time::timeout(limit, drain(&mut join_set)).await;
                if let Ok(resolutions) = timed {
                    resolutions
                } else {
                    warn!(
                        pending = join_set.len(),
                        seconds = limit.as_secs(),
                        "bootstrap deadline expired, aborting outstanding hosts"
                    );
                    join_set.shutdown().await;
                    return Err(BootstrapError::DeadlineExceeded {
                        seconds: limit.as_secs(),
                    });
                }
            }
        };

        classify(resolutions, &hosts_by_task)
    }
}

/// Full barrier: collect every task result as it resolves.
async fn drain(join_set: &mut JoinSet<Result<WorkerMessage>>) -> Vec<Resolution> {
    let mut resolutions = Vec::with_capacity(join_set.len());
    while let Some(resolution) = join_set.join_next_with_id().await {
        resolutions.push(resolution);
    }
    resolutions
}

fn classify(
    resolutions: Vec<Resolution>,
    hosts_by_task: &HashMap<Id, String>,
) -> Result<ResponseSet, BootstrapError> {
    let host_of = |id: Id| {
        hosts_by_task
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "<unknown>".to_string())
    };

    let mut responses = ResponseSet::new();
    for resolution in resolutions {
        let (status, response) = match resolution {
            Ok((_, Ok(message))) => message,
            Ok((id, Err(e))) => {
                let host = host_of(id);
                let reason = format!("{e:#}");
                warn!(host = %host, error = %reason, "worker failed outside its contract");
                return Err(BootstrapError::ContractViolation { host, reason });
            }
            Err(e) => {
                let host = host_of(e.id());
                warn!(host = %host, error = %e, "worker task did not complete");
                return Err(BootstrapError::ContractViolation {
                    host,
                    reason: e.to_string(),
                });
            }
        };
        debug!(host = %response.host, ?status, "host resolved");
        responses.add(status, response);
    }
    Ok(responses)
}
