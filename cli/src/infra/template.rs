//! Handlebars implementation of the `HostContext` port.
//!
//! Reads the validator key, optional data bag secret and the bootstrap
//! template from disk, renders the template for one host and wraps the
//! result into the command line executed over SSH.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::{Value, json};

use crate::application::ports::HostContext;
use crate::domain::command::{TemplateDir, bootstrap_command};
use crate::domain::config::BootstrapOptions;
use crate::domain::error::BootstrapError;

/// Environment variable overriding the template directory.
pub const TEMPLATES_ENV: &str = "FLEETBOOT_TEMPLATES";

/// Template directory: `$FLEETBOOT_TEMPLATES`, else the bundled `bootstrappers/`.
#[must_use]
pub fn default_template_dir() -> TemplateDir {
    std::env::var_os(TEMPLATES_ENV).map_or_else(
        || TemplateDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("bootstrappers")),
        TemplateDir::new,
    )
}

/// Renders bootstrap commands from templates in a `TemplateDir`.
pub struct TemplateHostContext {
    templates: TemplateDir,
}

impl TemplateHostContext {
    #[must_use]
    pub fn new(templates: TemplateDir) -> Self {
        Self { templates }
    }

    /// Template used for `options`, falling back to the default one.
    ///
    /// A bare name such as `omnibus` selects a bundled template; anything
    /// else is taken as a path.
    #[must_use]
    pub fn template_path(&self, options: &BootstrapOptions) -> PathBuf {
        match options.template.as_deref() {
            None => self.templates.default_template(),
            Some(path) => match bare_name(path) {
                Some(name) => self.templates.template(name),
                None => expand_home(path),
            },
        }
    }

    /// Values the template can reference.
    ///
    /// # Errors
    ///
    /// Returns `MissingValidatorPath` or `UnreadableFile` when the key files
    /// cannot be loaded.
    pub fn template_data(&self, host: &str, options: &BootstrapOptions) -> Result<Value> {
        let validator_path = options
            .validator_path
            .as_deref()
            .ok_or(BootstrapError::MissingValidatorPath)?;
        let validation_key = read_file("validator key", validator_path)?;
        let secret = options
            .encrypted_data_bag_secret_path
            .as_deref()
            .map(|path| read_file("encrypted data bag secret", path))
            .transpose()?;

        let hints: Vec<Value> = options
            .hints
            .iter()
            .map(|(name, content)| json!({ "name": name, "content": content.to_string() }))
            .collect();

        Ok(json!({
            "host": host,
            "node_name": host,
            "server_url": options.server_url,
            "validator_client": options.validator_client,
            "validation_key": validation_key.trim_end(),
            "encrypted_data_bag_secret": secret.as_deref().map(str::trim_end),
            "hints": hints,
            "first_boot": serde_json::to_string_pretty(&options.first_boot())?,
            "chef_version": options.chef_version,
            "environment": options.environment,
            "bootstrap_proxy": options.bootstrap_proxy,
        }))
    }
}

impl HostContext for TemplateHostContext {
    fn render(&self, host: &str, options: &BootstrapOptions) -> Result<String> {
        let data = self.template_data(host, options)?;
        let template_path = self.template_path(options);
        let source = read_file("bootstrap template", &template_path)?;

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        let script = handlebars
            .render_template(&source, &data)
            .with_context(|| format!("cannot render {}", template_path.display()))?;

        Ok(bootstrap_command(&script, options.sudo))
    }
}

fn read_file(what: &'static str, path: &Path) -> Result<String, BootstrapError> {
    let path = expand_home(path);
    std::fs::read_to_string(&path).map_err(|e| BootstrapError::UnreadableFile {
        what,
        path,
        reason: e.to_string(),
    })
}

fn bare_name(path: &Path) -> Option<&str> {
    let is_bare = path.components().count() == 1 && path.extension().is_none();
    if is_bare { path.to_str() } else { None }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
