//! Router agent
//!
//! Decides which perspectives should work on a document, based on its type
//! and whether a compliance check was requested.

use std::collections::HashMap;

use async_trait::async_trait;
use documinds_common::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::agent::{requester, Agent, AgentError, TaskContext, TaskData};
use crate::document::Document;
use crate::ledger::InteractionLedger;

/// Which perspectives handle which document type
#[derive(Debug, Clone)]
pub struct RoutingTable {
    routes: HashMap<String, Vec<Role>>,
    fallback: Vec<Role>,
}

impl RoutingTable {
    pub fn new(fallback: Vec<Role>) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    /// Route a document type (matched case-insensitively)
    pub fn with_route(mut self, document_type: &str, roles: Vec<Role>) -> Self {
        self.routes.insert(document_type.to_lowercase(), roles);
        self
    }

    pub fn roles_for(&self, document_type: &str) -> &[Role] {
        self.routes
            .get(&document_type.to_lowercase())
            .unwrap_or(&self.fallback)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new(vec![Role::extractor(), Role::summarizer()])
            .with_route("invoice", vec![Role::extractor(), Role::validator()])
            .with_route("receipt", vec![Role::extractor(), Role::validator()])
            .with_route("contract", vec![Role::extractor(), Role::analyzer(), Role::validator()])
            .with_route("report", vec![Role::extractor(), Role::analyzer(), Role::summarizer()])
            .with_route("email", vec![Role::extractor(), Role::summarizer()])
    }
}

/// Output of the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub document_type: String,
    pub perspectives: Vec<Role>,
    pub requires_compliance_check: bool,
    pub reasoning: String,
}

pub struct RouterAgent {
    id: String,
    table: RoutingTable,
    ledger: InteractionLedger,
}

impl RouterAgent {
    pub const KIND: &'static str = "router";

    pub fn new(id: impl Into<String>, table: RoutingTable) -> Self {
        let id = id.into();
        Self {
            ledger: InteractionLedger::new(id.clone()),
            id,
            table,
        }
    }

    /// Router with an externally built ledger (e.g. with test clocks)
    pub fn with_ledger(id: impl Into<String>, table: RoutingTable, ledger: InteractionLedger) -> Self {
        Self {
            id: id.into(),
            table,
            ledger,
        }
    }

    pub fn route(&self, document: &Document) -> RoutingDecision {
        let mut perspectives = self.table.roles_for(&document.document_type).to_vec();
        let mut reasoning = format!(
            "{} documents are handled by {}",
            document.document_type,
            join_roles(&perspectives)
        );

        if document.requires_compliance_check && !perspectives.contains(&Role::validator()) {
            perspectives.push(Role::validator());
            reasoning.push_str("; validator added for compliance check");
        }

        RoutingDecision {
            document_type: document.document_type.clone(),
            perspectives,
            requires_compliance_check: document.requires_compliance_check,
            reasoning,
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl Agent for RouterAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        Self::KIND
    }

    fn ledger(&self) -> &InteractionLedger {
        &self.ledger
    }

    async fn process(
        &self,
        task: &TaskData,
        context: Option<&TaskContext>,
    ) -> Result<Value, AgentError> {
        let document = Document::from_task(task)?;
        let from = requester(context);

        self.log_interaction(
            &from,
            &self.id,
            &format!("route {} document", document.document_type),
            "document submitted for processing",
        );

        let decision = self.route(&document);
        for role in &decision.perspectives {
            self.log_interaction(
                &self.id,
                role.as_str(),
                &format!("process {} document", document.document_type),
                &decision.reasoning,
            );
        }

        info!(
            document_type = %decision.document_type,
            perspectives = %join_roles(&decision.perspectives),
            "Routed document"
        );
        Ok(serde_json::to_value(decision)?)
    }
}
