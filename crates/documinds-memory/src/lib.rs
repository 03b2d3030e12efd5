//! # DocuMinds Federated Memory
//!
//! A shared pool of extracted facts that every agent reads through a lens
//! tailored to its role.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   FederatedMemory                       │
//! │  ┌──────────────────────┐   ┌────────────────────────┐  │
//! │  │ store (fan-out write)│   │ retrieve_for_agent     │  │
//! │  │ KeyDeriver +         │   │ MemoryRetriever        │  │
//! │  │ PerspectiveRegistry  │   │ (scan → score → sort)  │  │
//! │  └──────────┬───────────┘   └───────────┬────────────┘  │
//! │             │                           │ RelevanceRanker
//! │  ┌──────────┴───────────────────────────┴────────────┐  │
//! │  │        MemoryBackend (put / get / scan)           │  │
//! │  │        InMemoryBackend | RedisBackend             │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys follow `memory:<role>:<content hash>` and expire after 30 days.

pub mod domain;
pub mod infra;
pub mod service;

// Re-export core types
pub use domain::keys::KeyDeriver;
pub use domain::perspective::{Perspective, PerspectiveRegistry};
pub use domain::ranking::{LexicalRanker, RelevanceRanker, RoleWeights};
pub use domain::record::{MemoryRecord, Metadata, RetrievedMemory};
pub use domain::retrieval::{MemoryRetriever, RetrievalConfig};

// Re-export infrastructure
pub use infra::backend::{MemoryBackend, RecordStream, StoreError};
pub use infra::in_memory::InMemoryBackend;
pub use infra::redis_store::RedisBackend;

pub use service::{FederatedMemory, FederatedMemoryConfig, StoreReport, WriteOutcome};
