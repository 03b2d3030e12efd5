//! Core domain types

pub mod interaction;
pub mod role;
