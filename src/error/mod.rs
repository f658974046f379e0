//! Error handling
//!
//! Defines error types for storage operations.

pub mod types;

pub use types::*;
