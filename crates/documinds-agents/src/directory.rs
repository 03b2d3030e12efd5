//! Agent directory
//!
//! Holds the running agents by kind and serves read-only audit trails.

use std::collections::BTreeMap;
use std::sync::Arc;

use documinds_common::InteractionRecord;
use tracing::debug;

use crate::agent::Agent;

#[derive(Default)]
pub struct AgentDirectory {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its kind, replacing any previous one
    pub fn register(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.kind().to_string(), agent);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(kind)
    }

    /// Snapshot of an agent's ledger; empty for an unknown kind
    pub fn audit_trail(&self, kind: &str) -> Vec<InteractionRecord> {
        match self.agents.get(kind) {
            Some(agent) => agent.audit_trail(),
            None => {
                debug!(kind = %kind, "Audit requested for unknown agent");
                Vec::new()
            }
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{RouterAgent, RoutingTable};

    #[test]
    fn test_audit_trail_lookup() {
        let router = Arc::new(RouterAgent::new("router-1", RoutingTable::default()));
        router.log_interaction("api", "router-1", "route memo", "upload");

        let directory = AgentDirectory::new().register(router);
        assert_eq!(directory.audit_trail("router").len(), 1);
        assert!(directory.audit_trail("summarizer").is_empty());
        assert_eq!(directory.kinds().collect::<Vec<_>>(), ["router"]);
    }
}
