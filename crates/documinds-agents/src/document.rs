//! Document payload carried in agent tasks

use documinds_memory::Metadata;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, TaskData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub document_type: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub requires_compliance_check: bool,
}

impl Document {
    /// Read the `document` field of a task
    pub fn from_task(task: &TaskData) -> Result<Self, AgentError> {
        let raw = task
            .get("document")
            .cloned()
            .ok_or_else(|| AgentError::InvalidTask("missing `document` field".to_string()))?;
        serde_json::from_value(raw)
            .map_err(|e| AgentError::InvalidTask(format!("malformed document: {}", e)))
    }
}
