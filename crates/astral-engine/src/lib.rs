//! The Astral engine.
//!
//! [`AstralDB`] is the embedding API: it owns a graph store, the schema
//! it was created under, the plugin registry, and the run report history,
//! and exposes import, save/open, find, and plugin execution on top of
//! them.

mod config;
mod database;

pub use config::Config;
pub use database::AstralDB;
