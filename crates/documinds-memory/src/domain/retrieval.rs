//! Retrieval pipeline
//!
//! scan → score → filter → sort → truncate:
//! 1. Scan every live record in the role's key namespace
//! 2. Score each record's fact against the query with the ranker
//! 3. Drop anything scoring at or below the relevance threshold
//! 4. Sort by descending score, fresher records first on ties
//! 5. Keep the first `limit`

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use super::keys::KeyDeriver;
use super::ranking::RelevanceRanker;
use super::record::{MemoryRecord, RetrievedMemory};
use crate::infra::backend::{MemoryBackend, StoreError};

/// Configuration for the retrieval pipeline
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Records must score strictly above this to be returned
    pub relevance_threshold: f64,
    /// Bound on the whole scan
    pub backend_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: documinds_common::DEFAULT_RELEVANCE_THRESHOLD,
            backend_timeout: Duration::from_millis(documinds_common::DEFAULT_BACKEND_TIMEOUT_MS),
        }
    }
}

/// Memory retriever
pub struct MemoryRetriever {
    backend: Arc<dyn MemoryBackend>,
    keys: KeyDeriver,
    ranker: Arc<dyn RelevanceRanker>,
    config: RetrievalConfig,
}

impl MemoryRetriever {
    pub fn new(
        backend: Arc<dyn MemoryBackend>,
        keys: KeyDeriver,
        ranker: Arc<dyn RelevanceRanker>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            backend,
            keys,
            ranker,
            config,
        }
    }

    /// Top `limit` records relevant to `query` from the role's namespace
    ///
    /// An empty query or a zero limit returns nothing without touching the
    /// backend.
    pub async fn retrieve(
        &self,
        role: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedMemory>, StoreError> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prefix = self.keys.namespace_prefix(role);
        let timeout = self.config.backend_timeout;
        let candidates = tokio::time::timeout(timeout, self.collect_live(&prefix))
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;

        let scanned = candidates.len();
        let results = self.rank(role, query, candidates, limit);

        debug!(
            role = %role,
            scanned,
            returned = results.len(),
            "Retrieved memories"
        );
        Ok(results)
    }

    /// Drain a scan, skipping records that fail to decode
    async fn collect_live(&self, prefix: &str) -> Result<Vec<MemoryRecord>, StoreError> {
        let mut stream = self.backend.scan(prefix).await?;
        let mut records = Vec::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(record) => records.push(record),
                Err(StoreError::Serialization(e)) => {
                    warn!(prefix = %prefix, "Skipping undecodable record: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    /// Score, filter, sort, and truncate an already-fetched candidate set
    pub fn rank(
        &self,
        role: &str,
        query: &str,
        candidates: Vec<MemoryRecord>,
        limit: usize,
    ) -> Vec<RetrievedMemory> {
        let mut scored: Vec<RetrievedMemory> = candidates
            .into_iter()
            .filter_map(|record| {
                let score = self.ranker.score(query, &record.fact, role);
                (score > self.config.relevance_threshold).then_some(RetrievedMemory {
                    record,
                    relevance_score: score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            OrderedFloat(b.relevance_score)
                .cmp(&OrderedFloat(a.relevance_score))
                .then_with(|| b.record.stored_at.cmp(&a.record.stored_at))
        });
        scored.truncate(limit);
        scored
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}
