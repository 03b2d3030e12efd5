//! # DocuMinds Agents
//!
//! Agents are independent implementations of one capability interface,
//! [`Agent`], composed by dependency injection:
//!
//! - [`RouterAgent`]: decides which perspectives should work on a document
//! - [`OrchestratorAgent`]: plans and runs the workflow against federated memory
//!
//! Every agent owns an append-only [`InteractionLedger`] recording who asked
//! whom to do what and why. [`AgentDirectory`] exposes read-only snapshots
//! of those ledgers.

pub mod agent;
pub mod directory;
pub mod document;
pub mod ledger;
pub mod orchestrator;
pub mod router;

pub use agent::{Agent, AgentError, TaskContext, TaskData};
pub use directory::AgentDirectory;
pub use document::Document;
pub use ledger::InteractionLedger;
pub use orchestrator::{OrchestratorAgent, StepResult, WorkflowPlan, WorkflowResult, WorkflowStep};
pub use router::{RouterAgent, RoutingDecision, RoutingTable};
