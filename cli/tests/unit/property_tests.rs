//! Property-based tests for host normalization and command shaping.

#![allow(clippy::expect_used)]

use std::collections::HashSet;

use proptest::prelude::*;

use fleetboot_cli::domain::{bootstrap_command, normalize_hosts};

proptest! {
    /// Normalized hosts are unique, trimmed and never blank.
    #[test]
    fn prop_normalized_hosts_unique_and_trimmed(
        hosts in proptest::collection::vec("[ ]{0,2}[a-c]{0,3}[ ]{0,2}", 0..20),
    ) {
        let normalized = normalize_hosts(&hosts);
        let unique: HashSet<_> = normalized.iter().collect();
        prop_assert_eq!(unique.len(), normalized.len());
        for host in &normalized {
            prop_assert!(!host.is_empty());
            prop_assert_eq!(host.trim(), host.as_str());
        }
    }

    /// Every non-blank input host survives, in first-occurrence order.
    #[test]
    fn prop_normalized_hosts_keep_first_occurrence_order(
        hosts in proptest::collection::vec("[a-d]{1,2}", 0..20),
    ) {
        let normalized = normalize_hosts(&hosts);
        let mut seen = HashSet::new();
        let expected: Vec<_> = hosts.iter().filter(|h| seen.insert(h.as_str())).cloned().collect();
        prop_assert_eq!(normalized, expected);
    }

    /// The wrapped command always stays a single-quoted `bash -c` word.
    #[test]
    fn prop_bootstrap_command_is_single_shell_word(script in "[a-z '\"$]{0,40}", sudo in proptest::bool::ANY) {
        let command = bootstrap_command(&script, sudo);
        let prefix = if sudo { "sudo bash -c '" } else { "bash -c '" };
        prop_assert!(command.starts_with(prefix));
        prop_assert!(command.ends_with('\''));
        let body = &command[prefix.len()..command.len() - 1];
        prop_assert_eq!(body.replace(r"'\''", ""), script.replace('\'', ""));
    }
}
