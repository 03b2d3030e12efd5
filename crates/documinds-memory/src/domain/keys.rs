//! Key derivation
//!
//! Keys have the layout `<namespace>:<role>:<blake3 hex of the fact>`.
//! No salt is mixed in, so the same fact under the same role always lands
//! on the same slot and a re-store overwrites.

use documinds_common::DEFAULT_KEY_NAMESPACE;

/// Derives storage keys for (fact, role) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDeriver {
    namespace: String,
}

impl KeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Storage key for a fact as seen by a role
    pub fn derive(&self, fact: &str, role: &str) -> String {
        format!("{}{}", self.namespace_prefix(role), Self::content_hash(fact))
    }

    /// Prefix shared by every key written under a role
    pub fn namespace_prefix(&self, role: &str) -> String {
        format!("{}:{}:", self.namespace, role)
    }

    /// Whether `key` sits directly under `prefix`
    ///
    /// Roles may contain `:`, so `memory:legal:private:<hash>` starts with
    /// `memory:legal:` without belonging to `legal`. Only a single trailing
    /// segment is accepted.
    pub fn is_direct_child(key: &str, prefix: &str) -> bool {
        key.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains(':'))
    }

    /// Hex digest of the fact's UTF-8 bytes
    pub fn content_hash(fact: &str) -> String {
        blake3::hash(fact.as_bytes()).to_hex().to_string()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}
