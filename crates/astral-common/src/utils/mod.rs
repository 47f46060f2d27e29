//! Common utilities used throughout Astral.
//!
//! - [`error`] - Error types like [`Error`] and the crate-wide [`Result`](error::Result)
//! - [`hash`] - Fast hashing with FxHash (non-cryptographic)
//! - [`strings`] - Edit distance and suggestion helpers

pub mod error;
pub mod hash;
pub mod strings;

pub use error::{Error, Result};
