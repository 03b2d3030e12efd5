//! Role - the perspective an agent takes over the shared fact pool
//!
//! Well-known roles:
//! - extractor: cares about data, structure, format
//! - analyzer: cares about insight, pattern, correlation
//! - summarizer: cares about narrative, key points, action items
//! - validator: cares about accuracy, completeness, consistency
//!
//! Any other identifier is a valid role too. Unknown roles participate in
//! storage and retrieval with no lens and default weight.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Agent role identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const EXTRACTOR: &'static str = "extractor";
    pub const ANALYZER: &'static str = "analyzer";
    pub const SUMMARIZER: &'static str = "summarizer";
    pub const VALIDATOR: &'static str = "validator";

    /// Create a role from any identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn extractor() -> Self {
        Self::new(Self::EXTRACTOR)
    }

    pub fn analyzer() -> Self {
        Self::new(Self::ANALYZER)
    }

    pub fn summarizer() -> Self {
        Self::new(Self::SUMMARIZER)
    }

    pub fn validator() -> Self {
        Self::new(Self::VALIDATOR)
    }

    /// Get the role identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Role {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        &self.0
    }
}
