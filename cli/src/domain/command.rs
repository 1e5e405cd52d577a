//! Bootstrap command shaping and template location.
//!
//! Pure functions only: the template files themselves are read by
//! `crate::infra::template`.

use std::path::{Path, PathBuf};

/// File name of the default template, one per installation method.
pub const DEFAULT_TEMPLATE_NAME: &str = "omnibus";
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Directory holding the named bootstrap templates.
///
/// Injected into the host context rather than looked up globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template named `name` (without extension).
    #[must_use]
    pub fn template(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    /// Path of the omnibus template.
    #[must_use]
    pub fn default_template(&self) -> PathBuf {
        self.template(DEFAULT_TEMPLATE_NAME)
    }
}

/// Quote `script` for use inside a single-quoted shell word.
#[must_use]
pub fn escape_single_quotes(script: &str) -> String {
    script.replace('\'', r"'\''")
}

/// Wrap a rendered script into the command line executed on the host.
#[must_use]
pub fn bootstrap_command(script: &str, sudo: bool) -> String {
    let command = format!("bash -c '{}'", escape_single_quotes(script));
    if sudo {
        format!("sudo {command}")
    } else {
        command
    }
}
