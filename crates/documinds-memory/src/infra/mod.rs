//! Storage backends for memory records

pub mod backend;
pub mod in_memory;
pub mod redis_store;
