//! Shared types and utilities for the Astral graph engine.
//!
//! - [`types`] - element identifiers and the dynamic [`Value`](types::Value)
//! - [`utils`] - error types, fast hashing, and string helpers

pub mod types;
pub mod utils;

pub use types::{AttrType, ElementType, GraphId, TransactionId, Value, VertexId};
pub use utils::error::{Error, Result};
