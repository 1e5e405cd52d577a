//! Human-readable terminal renderer.

use std::path::Path;

use fleetboot_common::{HostResponse, ResponseSet};
use owo_colors::OwoColorize as _;

use crate::domain::config::BootstrapConfig;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the per-host result of a bootstrap run.
    pub fn render_responses(&self, responses: &ResponseSet) {
        if responses.is_empty() {
            self.ctx.info("No hosts to bootstrap.");
            return;
        }

        for response in responses.oks() {
            self.ctx.success(&response.host);
        }
        for response in responses.errors() {
            // Failures are never suppressed.
            self.ctx.error(&format_failure(response));
        }

        if !self.ctx.quiet {
            println!();
        }
        self.ctx.kv(
            "Summary:",
            &format_summary(responses.oks().len(), responses.errors().len()),
        );
    }

    /// Render the effective file configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn render_config(&self, config: &BootstrapConfig, path: &Path) -> anyhow::Result<()> {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let yaml = serde_yaml::to_string(&config.redacted())?;
        for line in yaml.lines() {
            println!("  {line}");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["FLEETBOOT_CONFIG", "FLEETBOOT_TEMPLATES", "RUST_LOG", "NO_COLOR"] {
            println!(
                "    {:<22} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        Ok(())
    }

    /// Render a bare path, one line, for use in scripts.
    #[allow(clippy::unused_self)]
    pub fn render_path(&self, path: &Path) {
        println!("{}", path.display());
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("fleetboot {version}");
    }
}

/// One-line description of a failed host.
#[must_use]
pub fn format_failure(response: &HostResponse) -> String {
    let reason = response
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no output");
    match response.exit_code {
        Some(code) => format!("{}: exit {code}: {reason}", response.host),
        None => format!("{}: {reason}", response.host),
    }
}

/// `"2 ok, 1 failed"` style summary.
#[must_use]
pub fn format_summary(ok: usize, failed: usize) -> String {
    format!("{ok} ok, {failed} failed")
}
