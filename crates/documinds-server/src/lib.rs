//! DocuMinds service
//!
//! Configuration and the HTTP surface for the `documinds` binary.

pub mod api;
pub mod config;

pub use api::{router, ApiError, AppState};
pub use config::{MemorySettings, ServerConfig};
