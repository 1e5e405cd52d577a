//! Domain types for bootstrap configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::BootstrapError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Chef version installed when none is requested.
pub const CHEF_VERSION: &str = "11.4.0";
pub const DEFAULT_SSH_TIMEOUT: f64 = 1.5;
pub const DEFAULT_ENVIRONMENT: &str = "_default";
pub const DEFAULT_VALIDATOR_CLIENT: &str = "chef-validator";

// ── SSH ──────────────────────────────────────────────────────────────────────

/// One identity file or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SshKeys {
    One(String),
    Many(Vec<String>),
}

impl SshKeys {
    /// Identity files in the order they should be offered.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::One(path) => vec![path.as_str()],
            Self::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Connection settings shared read-only by every dispatch of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SshConfig {
    pub user: String,
    pub password: Option<String>,
    pub keys: Option<SshKeys>,
    /// Connection timeout in seconds.
    pub timeout: f64,
}

impl SshConfig {
    /// Timeout rounded up to whole seconds, as the ssh client expects.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn connect_timeout_secs(&self) -> u64 {
        (self.timeout.ceil() as u64).max(1)
    }
}

// ── Bootstrap options ────────────────────────────────────────────────────────

/// Everything the host context needs to render a bootstrap command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapOptions {
    pub validator_client: String,
    /// Validator key used for the first Chef run.
    pub validator_path: Option<PathBuf>,
    /// Proxy URL to bootstrap through.
    pub bootstrap_proxy: Option<String>,
    pub encrypted_data_bag_secret_path: Option<PathBuf>,
    /// Ohai hints placed on the node, keyed by hint name.
    pub hints: BTreeMap<String, Value>,
    /// Attributes for the first Chef run.
    pub attributes: Map<String, Value>,
    pub run_list: Vec<String>,
    pub chef_version: String,
    pub environment: String,
    pub sudo: bool,
    /// Template file. `None` selects the default omnibus template.
    pub template: Option<PathBuf>,
    pub server_url: Option<String>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            validator_client: DEFAULT_VALIDATOR_CLIENT.to_string(),
            validator_path: None,
            bootstrap_proxy: None,
            encrypted_data_bag_secret_path: None,
            hints: BTreeMap::new(),
            attributes: Map::new(),
            run_list: Vec::new(),
            chef_version: CHEF_VERSION.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            sudo: true,
            template: None,
            server_url: None,
        }
    }
}

impl BootstrapOptions {
    /// JSON handed to the first `chef-client` run: attributes plus run list.
    #[must_use]
    pub fn first_boot(&self) -> Value {
        let mut first_boot = self.attributes.clone();
        first_boot.insert(
            "run_list".to_string(),
            Value::Array(self.run_list.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(first_boot)
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Full input of a bootstrap run, also the schema of `~/.fleetboot/config.yaml`.
///
/// Every field is optional in the file; `ssh_user` is only enforced when a
/// run is constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<SshKeys>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_timeout: Option<f64>,
    #[serde(flatten)]
    pub options: BootstrapOptions,
}

impl BootstrapConfig {
    /// Extract the shared connection settings.
    ///
    /// # Errors
    ///
    /// Returns `MissingSshUser` if no (non-blank) user is set, or
    /// `InvalidTimeout` if the timeout is not a positive finite number.
    pub fn ssh_config(&self) -> Result<SshConfig, BootstrapError> {
        let user = self
            .ssh_user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(BootstrapError::MissingSshUser)?;

        let timeout = self.ssh_timeout.unwrap_or(DEFAULT_SSH_TIMEOUT);
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(BootstrapError::InvalidTimeout(timeout));
        }

        Ok(SshConfig {
            user: user.to_string(),
            password: self.ssh_password.clone(),
            keys: self.ssh_keys.clone(),
            timeout,
        })
    }

    /// Config with secrets blanked, safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.ssh_password.is_some() {
            copy.ssh_password = Some("********".to_string());
        }
        copy
    }
}

// ── Command-line values ──────────────────────────────────────────────────────

/// Parse `NAME` or `NAME=JSON` into a hint. A bare name gets `{}`.
///
/// # Errors
///
/// Returns `InvalidOption` for an empty name or invalid JSON.
pub fn parse_hint(raw: &str) -> Result<(String, Value), BootstrapError> {
    let (name, content) = match raw.split_once('=') {
        Some((name, json)) => {
            let content = serde_json::from_str(json).map_err(|e| BootstrapError::InvalidOption {
                key: "hint",
                reason: format!("{name}: {e}"),
            })?;
            (name.trim(), content)
        }
        None => (raw.trim(), Value::Object(Map::new())),
    };
    if name.is_empty() {
        return Err(BootstrapError::InvalidOption {
            key: "hint",
            reason: format!("missing hint name in '{raw}'"),
        });
    }
    Ok((name.to_string(), content))
}

/// Parse a JSON object of first-boot attributes.
///
/// # Errors
///
/// Returns `InvalidOption` if `raw` is not a JSON object.
pub fn parse_attributes(raw: &str) -> Result<Map<String, Value>, BootstrapError> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BootstrapError::InvalidOption {
            key: "attributes",
            reason: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(BootstrapError::InvalidOption {
            key: "attributes",
            reason: e.to_string(),
        }),
    }
}

/// Validate a seconds value given on the command line.
///
/// # Errors
///
/// Returns `InvalidOption` unless `secs` is finite and positive.
pub fn positive_seconds(key: &'static str, secs: f64) -> Result<Duration, BootstrapError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(Duration::from_secs_f64(secs))
    } else {
        Err(BootstrapError::InvalidOption {
            key,
            reason: format!("{secs} is not a positive number of seconds"),
        })
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
