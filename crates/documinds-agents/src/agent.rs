//! Agent capability interface

use async_trait::async_trait;
use documinds_common::{DocuMindsError, InteractionRecord};
use documinds_memory::StoreError;
use serde_json::Value;
use thiserror::Error;

use crate::ledger::InteractionLedger;

/// Structured task input
pub type TaskData = serde_json::Map<String, Value>;

/// Caller-supplied context accompanying a task
pub type TaskContext = serde_json::Map<String, Value>;

/// Errors raised while processing a task
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Memory error: {0}")]
    Memory(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AgentError> for DocuMindsError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Memory(e) => e.into(),
            AgentError::Serialization(e) => e.into(),
            AgentError::InvalidTask(msg) => DocuMindsError::Agent(msg),
        }
    }
}

/// What every agent can do
#[async_trait]
pub trait Agent: Send + Sync {
    /// Instance id, used as the `from`/`to` of ledger entries
    fn id(&self) -> &str;

    /// Agent category (e.g. "router")
    fn kind(&self) -> &str;

    /// The agent's own ledger
    fn ledger(&self) -> &InteractionLedger;

    /// Handle one task
    async fn process(
        &self,
        task: &TaskData,
        context: Option<&TaskContext>,
    ) -> Result<Value, AgentError>;

    fn log_interaction(
        &self,
        from_agent: &str,
        to_agent: &str,
        task: &str,
        reasoning: &str,
    ) -> InteractionRecord {
        self.ledger().append(from_agent, to_agent, task, reasoning)
    }

    /// Read-only copy of the ledger
    fn audit_trail(&self) -> Vec<InteractionRecord> {
        self.ledger().snapshot()
    }
}

/// Who handed us the task; `requester` in the context, else "external"
pub(crate) fn requester(context: Option<&TaskContext>) -> String {
    context
        .and_then(|c| c.get("requester"))
        .and_then(Value::as_str)
        .unwrap_or("external")
        .to_string()
}
