//! # DocuMinds Common
//!
//! Shared types, errors, and injectable collaborators for the DocuMinds
//! multi-agent document system.
//!
//! ## Core Types
//!
//! - [`Role`]: agent category with its own lens over the shared fact pool
//! - [`InteractionRecord`]: one entry of an agent's provenance ledger
//!
//! ## Collaborators
//!
//! - [`Clock`]: time source (system or manually driven)
//! - [`IdGenerator`]: interaction id source

pub mod clock;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use clock::{Clock, IdGenerator, ManualClock, SystemClock, UuidGenerator};
pub use error::{DocuMindsError, Result};
pub use types::{interaction::InteractionRecord, role::Role};

/// DocuMinds version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Retention window for stored facts, in days
pub const MEMORY_TTL_DAYS: i64 = 30;

/// Records scoring at or below this value never reach the caller
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.3;

/// Default number of records returned by a retrieval
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 10;

/// Leading segment of every memory key
pub const DEFAULT_KEY_NAMESPACE: &str = "memory";

/// Upper bound on a single backend call, in milliseconds
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;
