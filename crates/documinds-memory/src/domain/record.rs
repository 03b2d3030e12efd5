//! Memory record types
//!
//! One record exists per (fact, perspective) pair. The serialized layout
//! keeps the field names already present in deployed backends:
//! `fact`, `metadata`, `timestamp`, `perspectives`, `agent_keywords`.

use chrono::{DateTime, Utc};
use documinds_common::Role;
use serde::{Deserialize, Serialize};

/// Caller-supplied structured context, opaque to the store
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The unit of storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The asserted text
    pub fact: String,

    pub metadata: Metadata,

    /// When the write that produced this record happened
    #[serde(rename = "timestamp")]
    pub stored_at: DateTime<Utc>,

    /// Every role the originating write was fanned out to
    pub perspectives: Vec<Role>,

    /// Lens of the role this record was written under
    #[serde(rename = "agent_keywords")]
    pub lens_keywords: Vec<String>,
}

impl MemoryRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// A record with the relevance score computed for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMemory {
    #[serde(flatten)]
    pub record: MemoryRecord,

    pub relevance_score: f64,
}
