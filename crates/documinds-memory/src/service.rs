//! Federated memory facade
//!
//! Fans every stored fact out to one record per perspective and serves
//! role-scoped retrieval. Writes are last-writer-wins per key; there is no
//! locking and no rollback across perspectives.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use documinds_common::{Clock, Role, SystemClock};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::keys::KeyDeriver;
use crate::domain::perspective::PerspectiveRegistry;
use crate::domain::ranking::{LexicalRanker, RelevanceRanker, RoleWeights};
use crate::domain::record::{MemoryRecord, Metadata, RetrievedMemory};
use crate::domain::retrieval::{MemoryRetriever, RetrievalConfig};
use crate::infra::backend::{MemoryBackend, StoreError};

/// Federated memory configuration
#[derive(Debug, Clone)]
pub struct FederatedMemoryConfig {
    /// Leading key segment
    pub namespace: String,
    /// Retention window applied to every write
    pub ttl: Duration,
    /// Records must score strictly above this to be returned
    pub relevance_threshold: f64,
    /// Bound on each backend call
    pub backend_timeout: Duration,
}

impl Default for FederatedMemoryConfig {
    fn default() -> Self {
        Self {
            namespace: documinds_common::DEFAULT_KEY_NAMESPACE.to_string(),
            ttl: Duration::from_secs(documinds_common::MEMORY_TTL_DAYS as u64 * 24 * 60 * 60),
            relevance_threshold: documinds_common::DEFAULT_RELEVANCE_THRESHOLD,
            backend_timeout: Duration::from_millis(documinds_common::DEFAULT_BACKEND_TIMEOUT_MS),
        }
    }
}

/// Result of writing one perspective of a fan-out
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    Stored { key: String },
    Failed { error: String, retryable: bool },
}

impl WriteOutcome {
    fn from_result(key: String, result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => WriteOutcome::Stored { key },
            Err(e) => WriteOutcome::Failed {
                retryable: e.is_retryable(),
                error: e.to_string(),
            },
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, WriteOutcome::Stored { .. })
    }
}

/// Per-role outcome of a `store` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StoreReport {
    pub outcomes: BTreeMap<Role, WriteOutcome>,
}

impl StoreReport {
    /// Every targeted perspective was written
    pub fn is_complete(&self) -> bool {
        self.outcomes.values().all(WriteOutcome::is_stored)
    }

    pub fn stored_roles(&self) -> Vec<&Role> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_stored())
            .map(|(role, _)| role)
            .collect()
    }

    /// Roles the caller should retry
    pub fn failed_roles(&self) -> Vec<&Role> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_stored())
            .map(|(role, _)| role)
            .collect()
    }

    pub fn outcome(&self, role: &str) -> Option<&WriteOutcome> {
        self.outcomes.get(role)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Perspective-aware fact store shared by all agents
pub struct FederatedMemory {
    backend: Arc<dyn MemoryBackend>,
    registry: Arc<PerspectiveRegistry>,
    keys: KeyDeriver,
    retriever: MemoryRetriever,
    clock: Arc<dyn Clock>,
    config: FederatedMemoryConfig,
}

impl FederatedMemory {
    /// Federated memory with the lexical ranker
    pub fn new(
        backend: Arc<dyn MemoryBackend>,
        registry: Arc<PerspectiveRegistry>,
        weights: RoleWeights,
        config: FederatedMemoryConfig,
    ) -> Self {
        Self::with_ranker(backend, registry, Arc::new(LexicalRanker::new(weights)), config)
    }

    /// Federated memory with a caller-chosen ranker
    pub fn with_ranker(
        backend: Arc<dyn MemoryBackend>,
        registry: Arc<PerspectiveRegistry>,
        ranker: Arc<dyn RelevanceRanker>,
        config: FederatedMemoryConfig,
    ) -> Self {
        let keys = KeyDeriver::new(config.namespace.clone());
        let retriever = MemoryRetriever::new(
            backend.clone(),
            keys.clone(),
            ranker,
            RetrievalConfig {
                relevance_threshold: config.relevance_threshold,
                backend_timeout: config.backend_timeout,
            },
        );

        Self {
            backend,
            registry,
            keys,
            retriever,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Use `clock` for record timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Store a fact under each requested perspective
    ///
    /// `None` targets every registered role. Roles the registry does not
    /// know are written with an empty lens. Each perspective is an
    /// independent write; failures are reported per role and never abort
    /// the others.
    pub async fn store(
        &self,
        fact: &str,
        metadata: Metadata,
        perspectives: Option<&[Role]>,
    ) -> StoreReport {
        let targets: Vec<Role> = match perspectives {
            Some(requested) => {
                let mut unique: Vec<Role> = Vec::with_capacity(requested.len());
                for role in requested {
                    if !unique.contains(role) {
                        unique.push(role.clone());
                    }
                }
                unique
            }
            None => self.registry.roles().cloned().collect(),
        };

        let stored_at = self.clock.now();
        let writes = targets.iter().map(|role| {
            let key = self.keys.derive(fact, role.as_str());
            let record = MemoryRecord {
                fact: fact.to_string(),
                metadata: metadata.clone(),
                stored_at,
                perspectives: targets.clone(),
                lens_keywords: self.registry.lens_for(role.as_str()).to_vec(),
            };
            async move {
                let result = self.bounded(self.backend.put(&key, &record, self.config.ttl)).await;
                (role.clone(), WriteOutcome::from_result(key, result))
            }
        });

        let report = StoreReport {
            outcomes: join_all(writes).await.into_iter().collect(),
        };

        for (role, outcome) in &report.outcomes {
            if let WriteOutcome::Failed { error, .. } = outcome {
                warn!(role = %role, "Perspective write failed: {}", error);
            }
        }
        info!(
            fact_hash = %KeyDeriver::content_hash(fact),
            stored = report.stored_roles().len(),
            failed = report.failed_roles().len(),
            "Stored fact"
        );

        report
    }

    /// Relevance-ranked records from a role's namespace
    pub async fn retrieve_for_agent(
        &self,
        role: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedMemory>, StoreError> {
        self.retriever.retrieve(role, query, limit).await
    }

    /// The live record for a fact as seen by a role
    pub async fn get(&self, fact: &str, role: &str) -> Result<Option<MemoryRecord>, StoreError> {
        let key = self.keys.derive(fact, role);
        let record = self.bounded(self.backend.get(&key)).await?;
        debug!(key = %key, found = record.is_some(), "Fetched record");
        Ok(record)
    }

    pub fn registry(&self) -> &PerspectiveRegistry {
        &self.registry
    }

    pub fn keys(&self) -> &KeyDeriver {
        &self.keys
    }

    pub fn config(&self) -> &FederatedMemoryConfig {
        &self.config
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: std::future::Future<Output = Result<T, StoreError>>,
    {
        let timeout = self.config.backend_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(timeout))?
    }
}
