//! Application service: configuration use-cases.
//!
//! Effective settings are layered: built-in defaults, then the config file,
//! then command-line overrides.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::application::ports::ConfigStore;
use crate::domain::config::{BootstrapConfig, SshKeys};

/// Values given on the command line. `None` / empty leaves the file value.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub ssh_user: Option<String>,
    pub ssh_password: Option<String>,
    pub ssh_keys: Vec<String>,
    pub ssh_timeout: Option<f64>,
    pub validator_client: Option<String>,
    pub validator_path: Option<PathBuf>,
    pub bootstrap_proxy: Option<String>,
    pub encrypted_data_bag_secret_path: Option<PathBuf>,
    /// Added to (or replacing same-named) hints from the file.
    pub hints: Vec<(String, Value)>,
    /// Replaces the file's attributes when set.
    pub attributes: Option<Map<String, Value>>,
    /// Replaces the file's run list when non-empty.
    pub run_list: Vec<String>,
    pub chef_version: Option<String>,
    pub environment: Option<String>,
    pub no_sudo: bool,
    pub template: Option<PathBuf>,
    pub server_url: Option<String>,
}

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<BootstrapConfig> {
    store.load()
}

/// Apply command-line overrides on top of `config`.
#[must_use]
pub fn apply_overrides(mut config: BootstrapConfig, overrides: ConfigOverrides) -> BootstrapConfig {
    let ConfigOverrides {
        ssh_user,
        ssh_password,
        ssh_keys,
        ssh_timeout,
        validator_client,
        validator_path,
        bootstrap_proxy,
        encrypted_data_bag_secret_path,
        hints,
        attributes,
        run_list,
        chef_version,
        environment,
        no_sudo,
        template,
        server_url,
    } = overrides;

    config.ssh_user = ssh_user.or(config.ssh_user);
    config.ssh_password = ssh_password.or(config.ssh_password);
    config.ssh_timeout = ssh_timeout.or(config.ssh_timeout);
    match ssh_keys.len() {
        0 => {}
        1 => config.ssh_keys = ssh_keys.into_iter().next().map(SshKeys::One),
        _ => config.ssh_keys = Some(SshKeys::Many(ssh_keys)),
    }

    let opts = &mut config.options;
    if let Some(client) = validator_client {
        opts.validator_client = client;
    }
    opts.validator_path = validator_path.or(opts.validator_path.take());
    opts.bootstrap_proxy = bootstrap_proxy.or(opts.bootstrap_proxy.take());
    opts.encrypted_data_bag_secret_path =
        encrypted_data_bag_secret_path.or(opts.encrypted_data_bag_secret_path.take());
    opts.hints.extend(hints);
    if let Some(attributes) = attributes {
        opts.attributes = attributes;
    }
    if !run_list.is_empty() {
        opts.run_list = run_list;
    }
    if let Some(version) = chef_version {
        opts.chef_version = version;
    }
    if let Some(environment) = environment {
        opts.environment = environment;
    }
    if no_sudo {
        opts.sudo = false;
    }
    opts.template = template.or(opts.template.take());
    opts.server_url = server_url.or(opts.server_url.take());

    config
}
