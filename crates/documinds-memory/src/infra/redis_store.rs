//! Redis backend
//!
//! Records are stored as JSON strings with `SETEX`, so expiry is enforced
//! by Redis itself. Scans use cursor-based `SCAN MATCH` rather than `KEYS`
//! so a large keyspace never blocks the server.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::backend::{MemoryBackend, RecordStream, StoreError};
use crate::domain::keys::KeyDeriver;
use crate::domain::record::MemoryRecord;

/// Redis-based memory backend
pub struct RedisBackend {
    /// Redis client
    client: Client,
    /// Shared multiplexed connection, re-established lazily
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RedisBackend {
    /// Connect to Redis
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let backend = Self::lazy(redis_url)?;
        backend.get_connection().await?;
        Ok(backend)
    }

    /// Create the client without dialing; the first call connects
    pub fn lazy(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a connection, reconnecting if needed
    async fn get_connection(&self) -> Result<MultiplexedConnection, StoreError> {
        let guard = self.connection.read().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        drop(guard);

        let mut guard = self.connection.write().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;

        *guard = Some(connection.clone());
        Ok(connection)
    }

    /// Forget a connection that failed so the next call redials
    async fn reset_on_io_error(&self, err: &RedisError) {
        reset_connection(&self.connection, err).await;
    }
}

async fn reset_connection(connection: &RwLock<Option<MultiplexedConnection>>, err: &RedisError) {
    if err.is_io_error() || err.is_connection_dropped() {
        *connection.write().await = None;
    }
}

/// Keys directly under `prefix`, each once
///
/// `SCAN` may report a key in more than one cursor batch, and its glob
/// also matches keys of roles nested under this one.
fn select_keys(prefix: &str, scanned: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    scanned
        .into_iter()
        .filter(|key| KeyDeriver::is_direct_child(key, prefix))
        .collect()
}

/// Decode one GET result; keys that expired since the scan yield nothing
fn decode_fetched(
    fetched: Result<Option<String>, StoreError>,
) -> Option<Result<MemoryRecord, StoreError>> {
    match fetched {
        Ok(Some(json)) => Some(MemoryRecord::from_json(&json).map_err(StoreError::from)),
        Ok(None) => None,
        Err(e) => Some(Err(e)),
    }
}

/// Escape glob metacharacters so a prefix matches literally
pub fn escape_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unavailable(op: &str, err: RedisError) -> StoreError {
    StoreError::Unavailable(format!("Redis {} failed: {}", op, err))
}

#[async_trait]
impl MemoryBackend for RedisBackend {
    #[instrument(skip(self, record))]
    async fn put(&self, key: &str, record: &MemoryRecord, ttl: Duration) -> Result<(), StoreError> {
        let json = record.to_json()?;
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.get_connection().await?;
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, ttl_secs).await {
            warn!("Redis SETEX error: {}", e);
            self.reset_on_io_error(&e).await;
            return Err(unavailable("SETEX", e));
        }

        debug!(key = %key, ttl_secs, "Stored record");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<MemoryRecord>, StoreError> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Redis GET error: {}", e);
                self.reset_on_io_error(&e).await;
                return Err(unavailable("GET", e));
            }
        };

        raw.map(|json| MemoryRecord::from_json(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    #[instrument(skip(self))]
    async fn scan(&self, prefix: &str) -> Result<RecordStream, StoreError> {
        let pattern = format!("{}*", escape_pattern(prefix));
        let mut conn = self.get_connection().await?;

        let scanned: Vec<String> = {
            let mut iter = match conn.scan_match::<_, String>(&pattern).await {
                Ok(iter) => iter,
                Err(e) => {
                    self.reset_on_io_error(&e).await;
                    return Err(unavailable("SCAN", e));
                }
            };
            let mut scanned = Vec::new();
            while let Some(key) = iter.next_item().await {
                scanned.push(key);
            }
            scanned
        };

        let scanned_count = scanned.len();
        let keys = select_keys(prefix, scanned);
        debug!(pattern = %pattern, scanned = scanned_count, matched = keys.len(), "Scanned keys");

        let connection = self.connection.clone();
        let records = stream::iter(keys)
            .then(move |key| {
                let mut conn = conn.clone();
                let connection = connection.clone();
                async move {
                    match conn.get::<_, Option<String>>(&key).await {
                        Ok(raw) => Ok(raw),
                        Err(e) => {
                            warn!("Redis GET error during scan: {}", e);
                            reset_connection(&connection, &e).await;
                            Err(unavailable("GET", e))
                        }
                    }
                }
            })
            .filter_map(|fetched| async move { decode_fetched(fetched) })
            .boxed();

        Ok(records)
    }
}
