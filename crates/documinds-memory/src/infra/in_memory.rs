//! In-memory backend
//!
//! Keeps serialized records in a DashMap with an absolute expiry per key
//! and checks expiry on every read. Used for tests and single-process
//! deployments without Redis.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use documinds_common::{Clock, SystemClock};
use futures::stream::{self, StreamExt};
use tracing::debug;

use super::backend::{MemoryBackend, RecordStream, StoreError};
use crate::domain::keys::KeyDeriver;
use crate::domain::record::MemoryRecord;

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// In-memory storage implementation
pub struct InMemoryBackend {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Backend whose notion of "now" comes from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryBackend {
    async fn put(&self, key: &str, record: &MemoryRecord, ttl: Duration) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Unavailable(format!("TTL out of range: {}", e)))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| StoreError::Unavailable("TTL out of range".to_string()))?;
        let entry = Entry {
            payload: record.to_json()?,
            expires_at,
        };
        self.entries.insert(key.to_string(), entry);
        debug!(key = %key, "Stored record");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<MemoryRecord>, StoreError> {
        let now = self.clock.now();
        let payload = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => entry.payload.clone(),
            _ => return Ok(None),
        };
        Ok(Some(MemoryRecord::from_json(&payload)?))
    }

    async fn scan(&self, prefix: &str) -> Result<RecordStream, StoreError> {
        let now = self.clock.now();
        let payloads: Vec<String> = self
            .entries
            .iter()
            .filter(|e| KeyDeriver::is_direct_child(e.key(), prefix) && e.expires_at > now)
            .map(|e| e.payload.clone())
            .collect();

        debug!(prefix = %prefix, matched = payloads.len(), "Scanned records");

        Ok(stream::iter(payloads)
            .map(|payload| MemoryRecord::from_json(&payload).map_err(StoreError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Metadata;
    use documinds_common::{ManualClock, Role};
    use futures::TryStreamExt;

    const THIRTY_DAYS: Duration = Duration::from_secs(30 * 24 * 60 * 60);

    fn record(fact: &str) -> MemoryRecord {
        MemoryRecord {
            fact: fact.to_string(),
            metadata: Metadata::new(),
            stored_at: Utc::now(),
            perspectives: vec![Role::extractor()],
            lens_keywords: vec!["data".to_string()],
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let backend = InMemoryBackend::new();
        backend.put("memory:extractor:a", &record("a"), THIRTY_DAYS).await.unwrap();

        let fetched = backend.get("memory:extractor:a").await.unwrap();
        assert_eq!(fetched.unwrap().fact, "a");
        assert!(backend.get("memory:extractor:b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let backend = InMemoryBackend::new();
        backend.put("k", &record("first"), THIRTY_DAYS).await.unwrap();
        backend.put("k", &record("second"), THIRTY_DAYS).await.unwrap();

        assert_eq!(backend.len(), 1);
        assert_eq!(backend.get("k").await.unwrap().unwrap().fact, "second");
    }

    #[tokio::test]
    async fn test_scan_respects_prefix() {
        let backend = InMemoryBackend::new();
        backend.put("memory:extractor:1", &record("one"), THIRTY_DAYS).await.unwrap();
        backend.put("memory:extractor:2", &record("two"), THIRTY_DAYS).await.unwrap();
        backend.put("memory:validator:1", &record("three"), THIRTY_DAYS).await.unwrap();
        backend.put("memory:extractor:raw:1", &record("nested"), THIRTY_DAYS).await.unwrap();

        let found: Vec<MemoryRecord> = backend
            .scan("memory:extractor:")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_an_error() {
        let backend = InMemoryBackend::new();
        let ttl = Duration::from_secs(u64::MAX / 2);

        let err = backend.put("memory:extractor:x", &record("x"), ttl).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_expiry_window() {
        let clock = Arc::new(ManualClock::default());
        let backend = InMemoryBackend::with_clock(clock.clone());
        backend.put("memory:analyzer:x", &record("x"), THIRTY_DAYS).await.unwrap();

        clock.advance(chrono::Duration::days(29));
        assert!(backend.get("memory:analyzer:x").await.unwrap().is_some());
        let live: Vec<MemoryRecord> = backend
            .scan("memory:analyzer:")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(live.len(), 1);

        clock.advance(chrono::Duration::days(2));
        assert!(backend.get("memory:analyzer:x").await.unwrap().is_none());
        let live: Vec<MemoryRecord> = backend
            .scan("memory:analyzer:")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(live.is_empty());

        assert_eq!(backend.purge_expired(), 1);
        assert!(backend.is_empty());
    }
}
