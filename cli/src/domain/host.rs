//! Host list normalization and per-host dispatch requests.

use std::collections::HashSet;

/// Coerce `hosts` to strings, drop blanks and duplicates.
///
/// First occurrence wins, so the original order is kept for dispatch.
pub fn normalize_hosts<I, T>(hosts: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    let mut seen = HashSet::new();
    hosts
        .into_iter()
        .map(|h| h.to_string().trim().to_string())
        .filter(|h| !h.is_empty())
        .filter(|h| seen.insert(h.clone()))
        .collect()
}

/// A rendered bootstrap command bound to its target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    host: String,
    command: String,
}

impl DispatchRequest {
    #[must_use]
    pub fn new(host: String, command: String) -> Self {
        Self { host, command }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}
