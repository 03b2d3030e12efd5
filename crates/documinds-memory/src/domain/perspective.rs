//! Perspective Registry
//!
//! Static mapping from agent role to the keyword lens describing what that
//! role finds relevant. Built once and handed to the store; there is no
//! way to register a role at runtime.

use documinds_common::Role;
use serde::{Deserialize, Serialize};

/// A role and its lens keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub role: Role,
    pub lens: Vec<String>,
}

impl Perspective {
    pub fn new<I, S>(role: impl Into<Role>, lens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            lens: lens.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable, ordered set of perspectives
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveRegistry {
    perspectives: Vec<Perspective>,
}

impl PerspectiveRegistry {
    /// Build a registry. If a role appears twice the first definition wins.
    pub fn new(perspectives: impl IntoIterator<Item = Perspective>) -> Self {
        let mut unique: Vec<Perspective> = Vec::new();
        for perspective in perspectives {
            if !unique.iter().any(|p| p.role == perspective.role) {
                unique.push(perspective);
            }
        }
        Self {
            perspectives: unique,
        }
    }

    /// Lens for a role; empty for a role the registry does not know
    pub fn lens_for(&self, role: &str) -> &[String] {
        self.perspectives
            .iter()
            .find(|p| p.role.as_str() == role)
            .map(|p| p.lens.as_slice())
            .unwrap_or(&[])
    }

    /// Registered roles in registration order
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.perspectives.iter().map(|p| &p.role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.perspectives.iter().any(|p| p.role.as_str() == role)
    }

    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    pub fn len(&self) -> usize {
        self.perspectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perspectives.is_empty()
    }
}

impl Default for PerspectiveRegistry {
    fn default() -> Self {
        Self::new([
            Perspective::new(Role::EXTRACTOR, ["data", "structure", "format"]),
            Perspective::new(Role::ANALYZER, ["insight", "pattern", "correlation"]),
            Perspective::new(Role::SUMMARIZER, ["narrative", "key_points", "action_items"]),
            Perspective::new(Role::VALIDATOR, ["accuracy", "completeness", "consistency"]),
        ])
    }
}
