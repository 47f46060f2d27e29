//! Error types shared across the Astral crates.

use crate::types::ElementType;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for graph, schema, plugin, and import operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An attribute operation failed (unknown attribute, type mismatch, ...).
    #[error("attribute error: {0}")]
    Attribute(String),

    /// A graph element was not found.
    #[error("no such {element_type} with id {id}")]
    ElementNotFound {
        /// The kind of element looked up.
        element_type: ElementType,
        /// The raw id that was looked up.
        id: u64,
    },

    /// A schema operation failed (unknown factory, missing concept, ...).
    #[error("schema error: {0}")]
    Schema(String),

    /// A saved graph could not be migrated to the current schema version.
    #[error("schema update error: {0}")]
    SchemaUpdate(String),

    /// A plugin failed or was misconfigured.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// A plugin run was stopped through its interaction.
    #[error("plugin run cancelled")]
    Cancelled,

    /// A plugin parameter had the wrong type or an invalid value.
    #[error("invalid parameter {name:?}: {reason}")]
    Parameter {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A find/replace pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(String),

    /// An import file could not be parsed.
    #[error("import error: {0}")]
    Import(String),

    /// A snapshot was truncated or otherwise undecodable.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// Engine configuration was invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an element-not-found error.
    #[must_use]
    pub fn not_found(element_type: ElementType, id: u64) -> Self {
        Self::ElementNotFound { element_type, id }
    }
}
