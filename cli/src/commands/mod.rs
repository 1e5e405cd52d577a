//! Command implementations

pub mod bootstrap;
pub mod config;
pub mod version;
