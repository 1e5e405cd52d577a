use serde::{Deserialize, Serialize};

/// Status tag attached to every per-host outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// What a remote host answered for one bootstrap command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostResponse {
    pub host: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// Remote exit code. `None` when the command never produced one
    /// (connection refused, killed on timeout, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl HostResponse {
    /// Response for a host whose command could not run at all.
    #[must_use]
    pub fn failed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: None,
        }
    }
}

/// Per-host outcomes partitioned into successes and failures.
///
/// Each bucket keeps insertion order, which is the order outcomes were
/// classified in, not the order hosts were given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseSet {
    #[serde(rename = "ok")]
    oks: Vec<HostResponse>,
    #[serde(rename = "error")]
    errors: Vec<HostResponse>,
}

impl ResponseSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ok(&mut self, response: HostResponse) {
        self.oks.push(response);
    }

    pub fn add_error(&mut self, response: HostResponse) {
        self.errors.push(response);
    }

    /// File `response` into the bucket matching `status`.
    pub fn add(&mut self, status: ResponseStatus, response: HostResponse) {
        match status {
            ResponseStatus::Ok => self.add_ok(response),
            ResponseStatus::Error => self.add_error(response),
        }
    }

    #[must_use]
    pub fn oks(&self) -> &[HostResponse] {
        &self.oks
    }

    #[must_use]
    pub fn errors(&self) -> &[HostResponse] {
        &self.errors
    }

    /// Total number of outcomes across both buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.oks.len() + self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
