//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod host;

pub use command::{TemplateDir, bootstrap_command};
pub use config::{BootstrapConfig, BootstrapOptions, SshConfig, SshKeys};
pub use error::BootstrapError;
pub use host::{DispatchRequest, normalize_hosts};
