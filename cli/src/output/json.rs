//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the machine-readable form of a bootstrap result.

use anyhow::{Context, Result};
use fleetboot_common::ResponseSet;

/// Renders domain types as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render a bootstrap result as `{"ok": [...], "error": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_responses(&self, responses: &ResponseSet) -> Result<()> {
        println!("{}", format_responses(responses)?);
        Ok(())
    }

    /// Render an arbitrary serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_value(&self, value: &impl serde::Serialize) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }
}

/// Pretty JSON form of a bootstrap result.
pub fn format_responses(responses: &ResponseSet) -> Result<String> {
    serde_json::to_string_pretty(responses).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
