//! HTTP surface
//!
//! A thin axum layer over the agent pipeline and federated memory. Every
//! handler delegates to the library crates; nothing here owns state beyond
//! the shared [`AppState`].

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use documinds_agents::{
    Agent, AgentDirectory, AgentError, OrchestratorAgent, RouterAgent, RoutingTable, TaskContext,
    TaskData,
};
use documinds_common::Role;
use documinds_memory::{
    FederatedMemory, InMemoryBackend, MemoryBackend, Metadata, PerspectiveRegistry, RedisBackend,
    RetrievedMemory, StoreError, StoreReport,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<FederatedMemory>,
    pub router: Arc<RouterAgent>,
    pub orchestrator: Arc<OrchestratorAgent>,
    pub directory: Arc<AgentDirectory>,
    pub default_limit: usize,
}

impl AppState {
    /// Wire the agents around an already built memory service
    pub fn new(memory: Arc<FederatedMemory>, default_limit: usize) -> Self {
        let router = Arc::new(RouterAgent::new("router", RoutingTable::default()));
        let orchestrator = Arc::new(OrchestratorAgent::new("orchestrator", memory.clone()));
        let directory = AgentDirectory::new()
            .register(router.clone())
            .register(orchestrator.clone());

        Self {
            memory,
            router,
            orchestrator,
            directory: Arc::new(directory),
            default_limit,
        }
    }

    /// Build state from configuration, connecting to Redis when a URL is set
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn MemoryBackend> = match &config.memory.redis_url {
            Some(url) => {
                info!("Using Redis memory backend");
                Arc::new(RedisBackend::connect(url).await?)
            }
            None => {
                warn!("DOCUMINDS_REDIS_URL not set, memory is process-local");
                Arc::new(InMemoryBackend::new())
            }
        };

        let memory = FederatedMemory::new(
            backend,
            Arc::new(PerspectiveRegistry::default()),
            config.memory.role_weights(),
            config.memory.federated_memory_config(),
        );

        Ok(Self::new(Arc::new(memory), config.memory.default_limit))
    }
}

/// Handler failures
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Agent(AgentError::InvalidTask(_)) => StatusCode::BAD_REQUEST,
            ApiError::Agent(AgentError::Memory(e)) | ApiError::Store(e) => store_status(e),
            ApiError::Agent(AgentError::Serialization(_)) | ApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), "Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub content: String,
    pub document_type: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub requires_compliance_check: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub status: &'static str,
    pub routing_decision: Value,
    pub workflow_plan: Value,
    pub final_output: Value,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub agent_type: String,
    pub audit_trail: Vec<documinds_common::InteractionRecord>,
    pub total_interactions: usize,
}

#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    pub fact: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub perspectives: Option<Vec<Role>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<i64>,
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/process-document", post(process_document))
        .route("/api/v1/agent/:agent_type/audit", get(agent_audit))
        .route("/api/v1/memory", post(store_memory))
        .route("/api/v1/memory/:role/search", post(search_memory))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "documinds" }))
}

async fn process_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let mut document = serde_json::Map::new();
    document.insert("type".to_string(), Value::String(request.document_type));
    document.insert("content".to_string(), Value::String(request.content));
    document.insert("metadata".to_string(), Value::Object(request.metadata));
    document.insert(
        "requires_compliance_check".to_string(),
        Value::Bool(request.requires_compliance_check),
    );

    let mut context = TaskContext::new();
    context.insert("requester".to_string(), Value::String("api".to_string()));

    let mut task = TaskData::new();
    task.insert("document".to_string(), Value::Object(document));

    let routing_decision = state.router.process(&task, Some(&context)).await?;

    task.insert("routing".to_string(), routing_decision.clone());
    let mut outcome = state.orchestrator.process(&task, Some(&context)).await?;

    let workflow_plan = outcome
        .get_mut("workflow_plan")
        .map(Value::take)
        .unwrap_or(Value::Null);
    let final_output = outcome
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null);

    Ok(Json(DocumentResponse {
        status: "completed",
        routing_decision,
        workflow_plan,
        final_output,
    }))
}

async fn agent_audit(
    State(state): State<AppState>,
    Path(agent_type): Path<String>,
) -> Json<AuditResponse> {
    let audit_trail = state.directory.audit_trail(&agent_type);
    Json(AuditResponse {
        total_interactions: audit_trail.len(),
        agent_type,
        audit_trail,
    })
}

async fn store_memory(
    State(state): State<AppState>,
    Json(request): Json<StoreRequest>,
) -> (StatusCode, Json<StoreReport>) {
    let report = state
        .memory
        .store(&request.fact, request.metadata, request.perspectives.as_deref())
        .await;

    let status = if report.is_complete() {
        StatusCode::OK
    } else if report.stored_roles().is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::MULTI_STATUS
    };
    (status, Json(report))
}

async fn search_memory(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<RetrievedMemory>>, ApiError> {
    let limit = match request.limit {
        None => state.default_limit,
        Some(n) if n <= 0 => return Ok(Json(Vec::new())),
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };

    let found = state
        .memory
        .retrieve_for_agent(&role, &request.query, limit)
        .await?;
    Ok(Json(found))
}
