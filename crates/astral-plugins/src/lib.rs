//! Analysis plugins for Astral graphs.
//!
//! The [`GraphPlugin`] trait is the unit of execution: a named, described
//! operation with declared parameters that runs against a store and its
//! schema. Built-ins cover similarity scoring ([`similarity`]), finding
//! and replacing attribute values ([`find`]), and file import
//! ([`import`]). Every run is recorded in a [`report::ReportManager`].

pub mod find;
pub mod import;
pub mod params;
pub mod registry;
pub mod report;
pub mod similarity;
mod traits;

pub use params::{ParameterDef, ParameterType, Parameters};
pub use registry::PluginRegistry;
pub use traits::{GraphPlugin, Interaction, NullInteraction, PluginOutcome};
