//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Bootstrap errors ──────────────────────────────────────────────────────────

/// Errors that stop a bootstrap run as a whole.
///
/// A host that fails its bootstrap command is not an error here; it ends up
/// in the error bucket of the `ResponseSet`.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("ssh_user is required. Pass --ssh-user or set ssh_user in the config file.")]
    MissingSshUser,

    #[error(
        "validator_path is required. Pass --validator-path or set validator_path in the config file."
    )]
    MissingValidatorPath,

    #[error("cannot read {what} at {}: {reason}", path.display())]
    UnreadableFile {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid SSH timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),

    #[error("Invalid value for {key}: {reason}")]
    InvalidOption { key: &'static str, reason: String },

    #[error("Failed to acquire worker pool: {0}")]
    PoolAcquisition(String),

    #[error("Worker for host '{host}' broke the execution contract: {reason}")]
    ContractViolation { host: String, reason: String },

    #[error("Bootstrap did not finish within {seconds}s")]
    DeadlineExceeded { seconds: u64 },
}

impl BootstrapError {
    /// Stable machine-readable code used by JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSshUser
            | Self::MissingValidatorPath
            | Self::UnreadableFile { .. }
            | Self::InvalidTimeout(_)
            | Self::InvalidOption { .. } => "configuration_error",
            Self::PoolAcquisition(_) => "pool_acquisition_failed",
            Self::ContractViolation { .. } => "contract_violation",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }
}
