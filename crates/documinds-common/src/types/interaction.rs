//! Interaction record - one provenance entry of an agent's ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who asked whom to do what, and why
///
/// Serialized with the `from`/`to` field names used by the audit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Globally unique id assigned at append time
    pub interaction_id: Uuid,

    /// When the interaction was recorded
    pub timestamp: DateTime<Utc>,

    /// Delegating agent
    #[serde(rename = "from")]
    pub from_agent: String,

    /// Receiving agent
    #[serde(rename = "to")]
    pub to_agent: String,

    /// Task description
    pub task: String,

    /// Why the task was delegated
    pub reasoning: String,
}

impl InteractionRecord {
    /// Whether this agent took part in the interaction on either side
    pub fn involves(&self, agent_id: &str) -> bool {
        self.from_agent == agent_id || self.to_agent == agent_id
    }
}
