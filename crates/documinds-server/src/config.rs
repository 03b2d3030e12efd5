//! DocuMinds configuration

use std::time::Duration;

use anyhow::Result;
use documinds_common::{
    DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_KEY_NAMESPACE, DEFAULT_RELEVANCE_THRESHOLD,
    DEFAULT_RETRIEVAL_LIMIT, MEMORY_TTL_DAYS,
};
use documinds_memory::{FederatedMemoryConfig, RoleWeights};
use serde::{Deserialize, Serialize};
use tracing::warn;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Federated memory configuration
    pub memory: MemorySettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            memory: MemorySettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();
        Ok(Self::from_lookup(|name| std::env::var(name).ok()))
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        // Platform PORT first, DOCUMINDS_PORT overrides it
        if let Some(p) = parse_var(&lookup, "PORT") {
            cfg.port = p;
        }
        if let Some(host) = lookup("DOCUMINDS_HOST") {
            cfg.host = host;
        }
        if let Some(p) = parse_var(&lookup, "DOCUMINDS_PORT") {
            cfg.port = p;
        }

        // Memory settings
        if let Some(url) = lookup("DOCUMINDS_REDIS_URL").filter(|u| !u.is_empty()) {
            cfg.memory.redis_url = Some(url);
        }
        if let Some(ns) = lookup("DOCUMINDS_KEY_NAMESPACE").filter(|n| !n.is_empty()) {
            cfg.memory.namespace = ns;
        }
        if let Some(v) = parse_var::<u64>(&lookup, "DOCUMINDS_TTL_DAYS") {
            if v == 0 || v.checked_mul(SECS_PER_DAY).is_none() {
                warn!(value = v, "Ignoring out-of-range DOCUMINDS_TTL_DAYS");
            } else {
                cfg.memory.ttl_days = v;
            }
        }
        if let Some(v) = parse_var(&lookup, "DOCUMINDS_RELEVANCE_THRESHOLD") {
            cfg.memory.relevance_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "DOCUMINDS_DEFAULT_LIMIT") {
            cfg.memory.default_limit = v;
        }
        if let Some(v) = parse_var(&lookup, "DOCUMINDS_BACKEND_TIMEOUT_MS") {
            cfg.memory.backend_timeout_ms = v;
        }
        if let Some(raw) = lookup("DOCUMINDS_ROLE_WEIGHTS") {
            match parse_role_weights(&raw) {
                Ok(weights) => cfg.memory.role_weights = weights,
                Err(e) => warn!("Ignoring DOCUMINDS_ROLE_WEIGHTS: {}", e),
            }
        }

        cfg
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// Parse `role=weight` pairs separated by commas
pub fn parse_role_weights(raw: &str) -> Result<Vec<(String, f64)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (role, weight) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("expected role=weight, got `{}`", pair))?;
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid weight for `{}`", role.trim()))?;
            if weight < 0.0 {
                anyhow::bail!("negative weight for `{}`", role.trim());
            }
            Ok((role.trim().to_string(), weight))
        })
        .collect()
}

/// Federated memory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Redis connection URL; the in-memory backend is used when unset
    pub redis_url: Option<String>,
    /// Leading key segment
    pub namespace: String,
    /// Retention window in days
    pub ttl_days: u64,
    /// Minimum score a record must exceed to be returned
    pub relevance_threshold: f64,
    /// Retrieval limit when the caller gives none
    pub default_limit: usize,
    /// Bound on each backend call
    pub backend_timeout_ms: u64,
    /// Overrides on top of the default role weights
    pub role_weights: Vec<(String, f64)>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            ttl_days: MEMORY_TTL_DAYS as u64,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            default_limit: DEFAULT_RETRIEVAL_LIMIT,
            backend_timeout_ms: DEFAULT_BACKEND_TIMEOUT_MS,
            role_weights: Vec::new(),
        }
    }
}

impl MemorySettings {
    pub fn federated_memory_config(&self) -> FederatedMemoryConfig {
        FederatedMemoryConfig {
            namespace: self.namespace.clone(),
            ttl: Duration::from_secs(self.ttl_days.saturating_mul(SECS_PER_DAY)),
            relevance_threshold: self.relevance_threshold,
            backend_timeout: Duration::from_millis(self.backend_timeout_ms),
        }
    }

    pub fn role_weights(&self) -> RoleWeights {
        self.role_weights
            .iter()
            .fold(RoleWeights::default(), |weights, (role, weight)| {
                weights.with_weight(role.as_str(), *weight)
            })
    }
}
