//! Federated memory domain logic
//!
//! Perspective lenses, key derivation, record types, and the relevance
//! ranking and retrieval algorithm.

pub mod keys;
pub mod perspective;
pub mod ranking;
pub mod record;
pub mod retrieval;
