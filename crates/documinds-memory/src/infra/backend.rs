//! Memory backend port
//!
//! The narrow interface the federated memory needs from a time-bounded
//! key-value store: upsert with expiry, point read, and a scan over every
//! live record under a key prefix.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::record::MemoryRecord;

/// Lazily produced records from a scan
pub type RecordStream = BoxStream<'static, Result<MemoryRecord, StoreError>>;

/// Trait for memory storage backends
///
/// Implementations must never yield or return an expired record, and each
/// `put` must replace the previous value under the key atomically.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// Upsert a record that expires `ttl` from now
    async fn put(&self, key: &str, record: &MemoryRecord, ttl: Duration) -> Result<(), StoreError>;

    /// Get the live record under a key
    async fn get(&self, key: &str) -> Result<Option<MemoryRecord>, StoreError>;

    /// Every live record whose key is `prefix` plus exactly one more segment
    async fn scan(&self, prefix: &str) -> Result<RecordStream, StoreError>;
}

/// Errors from memory backend operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Backend outages and timeouts are worth retrying with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<StoreError> for documinds_common::DocuMindsError {
    fn from(err: StoreError) -> Self {
        use documinds_common::DocuMindsError;
        match err {
            StoreError::Unavailable(msg) => DocuMindsError::Storage(msg),
            StoreError::Timeout(after) => DocuMindsError::Timeout(format!("{:?}", after)),
            StoreError::Serialization(msg) => DocuMindsError::Serialization(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use documinds_common::DocuMindsError;

    #[test]
    fn test_retryable() {
        assert!(StoreError::Unavailable("refused".into()).is_retryable());
        assert!(StoreError::Timeout(Duration::from_millis(50)).is_retryable());
        assert!(!StoreError::Serialization("bad json".into()).is_retryable());
    }

    #[test]
    fn test_into_unified_error() {
        let err: DocuMindsError = StoreError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, DocuMindsError::Timeout(_)));
        assert!(err.is_transient());
    }
}
