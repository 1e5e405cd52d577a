//! Presentation-layer implementations of `ProgressReporter`.
//!
//! Application services emit progress through the port; these types decide
//! whether it becomes plain lines or a spinner.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` (suppressed when `ctx.quiet`)
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "!".style(self.ctx.styles.warning));
        }
    }
}

/// Discards progress so `--json` output stays machine-readable.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Spinner-backed reporter for interactive terminals.
///
/// A step starts (or relabels) the spinner; success or warn finishes it.
#[derive(Default)]
pub struct SpinnerReporter {
    bar: std::sync::OnceLock<ProgressBar>,
}

impl SpinnerReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the spinner if a run ended without a final message.
    pub fn clear(&self) {
        if let Some(pb) = self.bar.get() {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn step(&self, message: &str) {
        match self.bar.get() {
            Some(pb) => pb.set_message(message.to_string()),
            None => {
                let _ = self.bar.set(progress::spinner(message));
            }
        }
    }

    fn success(&self, message: &str) {
        match self.bar.get() {
            Some(pb) => progress::finish_success(pb, message),
            None => println!("  ✓ {message}"),
        }
    }

    fn warn(&self, message: &str) {
        match self.bar.get() {
            Some(pb) => progress::finish_warn(pb, message),
            None => println!("  ! {message}"),
        }
    }
}
