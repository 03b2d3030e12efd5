//! Orchestrator agent
//!
//! Turns a routing decision into a workflow plan, writes the document into
//! federated memory under exactly the planned perspectives, and gathers the
//! related knowledge each perspective already holds. A failed write or
//! lookup is reported in the result; it never aborts the workflow.

use std::sync::Arc;

use async_trait::async_trait;
use documinds_common::{Role, DEFAULT_RETRIEVAL_LIMIT};
use documinds_memory::{FederatedMemory, RetrievedMemory, StoreReport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{requester, Agent, AgentError, TaskContext, TaskData};
use crate::document::Document;
use crate::ledger::InteractionLedger;
use crate::router::RoutingDecision;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub order: usize,
    pub role: Role,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    pub workflow_id: Uuid,
    pub document_type: String,
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowPlan {
    pub fn roles(&self) -> Vec<Role> {
        self.steps.iter().map(|s| s.role.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub role: Role,
    /// Previously stored facts relevant to the document, excluding itself
    pub related_facts: Vec<RetrievedMemory>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub workflow_id: Uuid,
    pub stored: StoreReport,
    pub steps: Vec<StepResult>,
}

pub struct OrchestratorAgent {
    id: String,
    memory: Arc<FederatedMemory>,
    ledger: InteractionLedger,
}

impl OrchestratorAgent {
    pub const KIND: &'static str = "orchestrator";

    pub fn new(id: impl Into<String>, memory: Arc<FederatedMemory>) -> Self {
        let id = id.into();
        Self {
            ledger: InteractionLedger::new(id.clone()),
            id,
            memory,
        }
    }

    pub fn with_ledger(
        id: impl Into<String>,
        memory: Arc<FederatedMemory>,
        ledger: InteractionLedger,
    ) -> Self {
        Self {
            id: id.into(),
            memory,
            ledger,
        }
    }

    /// One step per routed role; registered roles first in registry order,
    /// then any others in routing order
    pub fn create_workflow_plan(&self, decision: &RoutingDecision) -> WorkflowPlan {
        let registry = self.memory.registry();
        let mut roles: Vec<Role> = registry
            .roles()
            .filter(|r| decision.perspectives.contains(r))
            .cloned()
            .collect();
        for role in &decision.perspectives {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }

        let steps = roles
            .into_iter()
            .enumerate()
            .map(|(order, role)| {
                let lens = registry.lens_for(role.as_str());
                let task = if lens.is_empty() {
                    format!("review {} document", decision.document_type)
                } else {
                    format!(
                        "review {} document for {}",
                        decision.document_type,
                        lens.join(", ")
                    )
                };
                WorkflowStep { order, role, task }
            })
            .collect();

        WorkflowPlan {
            workflow_id: Uuid::new_v4(),
            document_type: decision.document_type.clone(),
            steps,
        }
    }

    pub async fn execute_workflow(&self, plan: &WorkflowPlan, document: &Document) -> WorkflowResult {
        let mut metadata = document.metadata.clone();
        metadata.insert("document_type".to_string(), json!(plan.document_type));
        metadata.insert("workflow_id".to_string(), json!(plan.workflow_id));

        let roles = plan.roles();
        let stored = self
            .memory
            .store(&document.content, metadata, Some(roles.as_slice()))
            .await;

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let write = match stored.outcome(step.role.as_str()) {
                Some(outcome) if outcome.is_stored() => "document stored under its perspective",
                _ => "document write failed for this perspective",
            };
            self.log_interaction(&self.id, step.role.as_str(), &step.task, write);

            // One extra slot for the document itself, which is filtered out
            let result = match self
                .memory
                .retrieve_for_agent(
                    step.role.as_str(),
                    &document.content,
                    DEFAULT_RETRIEVAL_LIMIT + 1,
                )
                .await
            {
                Ok(found) => StepResult {
                    role: step.role.clone(),
                    related_facts: found
                        .into_iter()
                        .filter(|m| m.record.fact != document.content)
                        .take(DEFAULT_RETRIEVAL_LIMIT)
                        .collect(),
                    error: None,
                },
                Err(e) => {
                    warn!(role = %step.role, "Context retrieval failed: {}", e);
                    StepResult {
                        role: step.role.clone(),
                        related_facts: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            steps.push(result);
        }

        info!(
            workflow_id = %plan.workflow_id,
            steps = steps.len(),
            complete = stored.is_complete(),
            "Executed workflow"
        );

        WorkflowResult {
            workflow_id: plan.workflow_id,
            stored,
            steps,
        }
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &str {
        Self::KIND
    }

    fn ledger(&self) -> &InteractionLedger {
        &self.ledger
    }

    /// Expects `document` and `routing` (a [`RoutingDecision`]) in the task
    async fn process(
        &self,
        task: &TaskData,
        context: Option<&TaskContext>,
    ) -> Result<Value, AgentError> {
        let document = Document::from_task(task)?;
        let decision: RoutingDecision = task
            .get("routing")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| AgentError::InvalidTask("missing `routing` field".to_string()))?;

        self.log_interaction(
            &requester(context),
            &self.id,
            &format!("orchestrate {} workflow", decision.document_type),
            &decision.reasoning,
        );

        let plan = self.create_workflow_plan(&decision);
        let result = self.execute_workflow(&plan, &document).await;

        let mut output = serde_json::Map::new();
        output.insert("workflow_plan".to_string(), serde_json::to_value(&plan)?);
        output.insert("result".to_string(), serde_json::to_value(&result)?);
        Ok(Value::Object(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use documinds_memory::{
        FederatedMemoryConfig, InMemoryBackend, Metadata, PerspectiveRegistry, RoleWeights,
    };

    fn memory() -> Arc<FederatedMemory> {
        Arc::new(FederatedMemory::new(
            Arc::new(InMemoryBackend::new()),
            Arc::new(PerspectiveRegistry::default()),
            RoleWeights::default(),
            FederatedMemoryConfig::default(),
        ))
    }

    fn decision(perspectives: Vec<Role>) -> RoutingDecision {
        RoutingDecision {
            document_type: "report".to_string(),
            perspectives,
            requires_compliance_check: false,
            reasoning: "test".to_string(),
        }
    }

    #[test]
    fn test_plan_follows_registry_order() {
        let orchestrator = OrchestratorAgent::new("orchestrator-1", memory());
        let plan = orchestrator.create_workflow_plan(&decision(vec![
            Role::new("legal"),
            Role::summarizer(),
            Role::extractor(),
        ]));

        let roles: Vec<&str> = plan.steps.iter().map(|s| s.role.as_str()).collect();
        assert_eq!(roles, ["extractor", "summarizer", "legal"]);
        assert_eq!(plan.steps[0].task, "review report document for data, structure, format");
        assert_eq!(plan.steps[2].task, "review report document");
    }

    #[tokio::test]
    async fn test_execute_stores_only_planned_perspectives() {
        let memory = memory();
        let orchestrator = OrchestratorAgent::new("orchestrator-1", memory.clone());

        memory
            .store("quarterly revenue growth slowed", Metadata::new(), Some(&[Role::analyzer()]))
            .await;

        let document = Document {
            document_type: "report".to_string(),
            content: "quarterly revenue growth accelerated".to_string(),
            metadata: Metadata::new(),
            requires_compliance_check: false,
        };
        let plan = orchestrator.create_workflow_plan(&decision(vec![Role::analyzer()]));
        let result = orchestrator.execute_workflow(&plan, &document).await;

        assert!(result.stored.is_complete());
        assert_eq!(result.stored.len(), 1);
        assert!(memory.get(&document.content, "analyzer").await.unwrap().is_some());
        assert!(memory.get(&document.content, "extractor").await.unwrap().is_none());

        // The earlier analyzer fact is related (3 of 5 words); the document itself is excluded
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].related_facts.len(), 1);
        assert_eq!(
            result.steps[0].related_facts[0].record.fact,
            "quarterly revenue growth slowed"
        );

        let trail = orchestrator.audit_trail();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].to_agent, "analyzer");
    }

    #[tokio::test]
    async fn test_related_facts_fill_the_full_limit() {
        let memory = memory();
        let orchestrator = OrchestratorAgent::new("orchestrator-1", memory.clone());

        for i in 0..=DEFAULT_RETRIEVAL_LIMIT {
            memory
                .store(
                    &format!("quarterly revenue growth accelerated note{}", i),
                    Metadata::new(),
                    Some(&[Role::analyzer()]),
                )
                .await;
        }

        let document = Document {
            document_type: "report".to_string(),
            content: "quarterly revenue growth accelerated".to_string(),
            metadata: Metadata::new(),
            requires_compliance_check: false,
        };
        let plan = orchestrator.create_workflow_plan(&decision(vec![Role::analyzer()]));
        let result = orchestrator.execute_workflow(&plan, &document).await;

        let related = &result.steps[0].related_facts;
        assert_eq!(related.len(), DEFAULT_RETRIEVAL_LIMIT);
        assert!(related.iter().all(|m| m.record.fact != document.content));
    }

    #[tokio::test]
    async fn test_process_requires_routing() {
        let orchestrator = OrchestratorAgent::new("orchestrator-1", memory());
        let task: TaskData = json!({"document": {"type": "memo", "content": "hello"}})
            .as_object()
            .cloned()
            .unwrap();

        let err = orchestrator.process(&task, None).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidTask(_)));
    }
}
