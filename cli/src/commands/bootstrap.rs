//! `fleetboot bootstrap`: install Chef on every host concurrently.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::bootstrap::Bootstrapper;
use crate::application::services::config_service::{self, ConfigOverrides};
use crate::domain::BootstrapError;
use crate::domain::config::{parse_attributes, parse_hint, positive_seconds};
use crate::infra::command_runner::DEFAULT_EXEC_TIMEOUT;
use crate::infra::template::TemplateHostContext;
use crate::output::{SilentReporter, SpinnerReporter, TerminalReporter};

/// Exit status when the run completed but at least one host failed.
pub const EXIT_HOST_FAILURES: u8 = 2;

/// Arguments for the bootstrap command.
#[derive(Args, Debug, Default)]
pub struct BootstrapArgs {
    /// Hosts to bootstrap (duplicates are bootstrapped once)
    #[arg(required = true)]
    pub hosts: Vec<String>,

    /// SSH login user
    #[arg(long, env = "FLEETBOOT_SSH_USER")]
    pub ssh_user: Option<String>,

    /// SSH password (uses sshpass)
    #[arg(long, env = "FLEETBOOT_SSH_PASSWORD", hide_env_values = true)]
    pub ssh_password: Option<String>,

    /// SSH identity file (repeatable)
    #[arg(long = "ssh-key", value_name = "PATH")]
    pub ssh_keys: Vec<String>,

    /// SSH connect timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub ssh_timeout: Option<f64>,

    /// Name of the validation client
    #[arg(long)]
    pub validator_client: Option<String>,

    /// Path to the validation key
    #[arg(long, value_name = "PATH")]
    pub validator_path: Option<PathBuf>,

    /// HTTP proxy used on the host during bootstrap
    #[arg(long, value_name = "URL")]
    pub bootstrap_proxy: Option<String>,

    /// Path to the encrypted data bag secret
    #[arg(long, value_name = "PATH")]
    pub encrypted_data_bag_secret_path: Option<PathBuf>,

    /// Ohai hint as NAME or NAME=JSON (repeatable)
    #[arg(long = "hint", value_name = "NAME[=JSON]")]
    pub hints: Vec<String>,

    /// First-boot attributes as a JSON object
    #[arg(long, value_name = "JSON")]
    pub attributes: Option<String>,

    /// Comma-separated run list
    #[arg(long, value_delimiter = ',')]
    pub run_list: Vec<String>,

    /// Chef version to install
    #[arg(long)]
    pub chef_version: Option<String>,

    /// Chef environment
    #[arg(long)]
    pub environment: Option<String>,

    /// Run the bootstrap script without sudo
    #[arg(long)]
    pub no_sudo: bool,

    /// Template name or path
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Chef server URL written to client.rb
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Give up on the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<f64>,

    /// Kill the bootstrap command on a host after this many seconds
    #[arg(long, value_name = "SECS")]
    pub command_timeout: Option<f64>,
}

impl BootstrapArgs {
    /// Turn the flags into config overrides.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for malformed hints or attributes.
    pub fn overrides(&self) -> Result<ConfigOverrides, BootstrapError> {
        let hints = self
            .hints
            .iter()
            .map(|h| parse_hint(h))
            .collect::<Result<Vec<_>, _>>()?;
        let attributes = self.attributes.as_deref().map(parse_attributes).transpose()?;

        Ok(ConfigOverrides {
            ssh_user: self.ssh_user.clone(),
            ssh_password: self.ssh_password.clone(),
            ssh_keys: self.ssh_keys.clone(),
            ssh_timeout: self.ssh_timeout,
            validator_client: self.validator_client.clone(),
            validator_path: self.validator_path.clone(),
            bootstrap_proxy: self.bootstrap_proxy.clone(),
            encrypted_data_bag_secret_path: self.encrypted_data_bag_secret_path.clone(),
            hints,
            attributes,
            run_list: self
                .run_list
                .iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            chef_version: self.chef_version.clone(),
            environment: self.environment.clone(),
            no_sudo: self.no_sudo,
            template: self.template.clone(),
            server_url: self.server_url.clone(),
        })
    }
}

/// Run the bootstrap command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the run as a whole
/// fails. Failed hosts are reported, not returned as errors.
pub async fn run(app: &AppContext, args: BootstrapArgs) -> Result<ExitCode> {
    let deadline = args
        .deadline
        .map(|s| positive_seconds("deadline", s))
        .transpose()?;
    let command_timeout = args
        .command_timeout
        .map(|s| positive_seconds("command-timeout", s))
        .transpose()?
        .unwrap_or(DEFAULT_EXEC_TIMEOUT);

    let config = config_service::apply_overrides(
        config_service::load_config(&app.config_store)?,
        args.overrides()?,
    );
    let context = TemplateHostContext::new(app.templates.clone());
    let mut bootstrapper = Bootstrapper::new(&args.hosts, &config, &context)?;
    if let Some(deadline) = deadline {
        bootstrapper = bootstrapper.with_deadline(deadline);
    }

    let factory = app.ssh_pool_factory(command_timeout);
    let responses = if app.is_json() {
        bootstrapper.run(&factory, &SilentReporter).await?
    } else if app.output.show_progress() {
        let reporter = SpinnerReporter::new();
        let result = bootstrapper.run(&factory, &reporter).await;
        reporter.clear();
        result?
    } else {
        let reporter = TerminalReporter::new(&app.output);
        bootstrapper.run(&factory, &reporter).await?
    };

    app.renderer().render_responses(&responses)?;

    if responses.has_errors() {
        Ok(ExitCode::from(EXIT_HOST_FAILURES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
