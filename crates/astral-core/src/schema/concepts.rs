//! The built-in concepts.
//!
//! `BaseConcept` covers what every graph needs regardless of domain;
//! `AnalyticConcept` layers the analysis attributes on top.

use arcstr::{literal, ArcStr};
use astral_common::types::{AttrType, ElementType, Value};

use super::concept::{SchemaAttribute, SchemaConcept};

/// Well-known attribute and type names.
pub mod attrs {
    /// Display identifier carried by vertices and transactions.
    pub const IDENTIFIER: &str = "identifier";
    /// Selection flag carried by vertices and transactions.
    pub const SELECTED: &str = "selected";
    /// Element type name ("person", "document", ...).
    pub const TYPE: &str = "type";
    /// Where a vertex's data came from.
    pub const SOURCE: &str = "source";
    /// Relative importance weight.
    pub const WEIGHT: &str = "weight";
    /// Horizontal layout coordinate.
    pub const X: &str = "x";
    /// Vertical layout coordinate.
    pub const Y: &str = "y";
    /// Similarity score written on similarity transactions.
    pub const SIMILARITY: &str = "similarity";
    /// Graph display name.
    pub const NAME: &str = "name";

    /// Type written by the completion hooks when none is set.
    pub const TYPE_UNKNOWN: &str = "unknown";
    /// Transaction type linking vertices a similarity plugin scored.
    pub const TYPE_SIMILARITY: &str = "similarity";
}

/// Attributes every graph carries: identifiers and selection state.
pub struct BaseConcept;

impl SchemaConcept for BaseConcept {
    fn name(&self) -> &str {
        "base"
    }

    fn attributes(&self) -> Vec<SchemaAttribute> {
        vec![
            SchemaAttribute::new(ElementType::Graph, attrs::NAME, AttrType::String)
                .description("Display name of the graph"),
            SchemaAttribute::new(ElementType::Vertex, attrs::IDENTIFIER, AttrType::String)
                .description("Display identifier of the vertex"),
            SchemaAttribute::new(ElementType::Vertex, attrs::SELECTED, AttrType::Boolean)
                .description("Whether the vertex is selected")
                .default(Value::Bool(false)),
            SchemaAttribute::new(ElementType::Transaction, attrs::IDENTIFIER, AttrType::String)
                .description("Display identifier of the transaction"),
            SchemaAttribute::new(ElementType::Transaction, attrs::SELECTED, AttrType::Boolean)
                .description("Whether the transaction is selected")
                .default(Value::Bool(false)),
        ]
    }
}

/// Attributes used by the analysis plugins: types, sources, weights,
/// coordinates, and similarity scores.
pub struct AnalyticConcept;

impl SchemaConcept for AnalyticConcept {
    fn name(&self) -> &str {
        "analytic"
    }

    fn attributes(&self) -> Vec<SchemaAttribute> {
        vec![
            SchemaAttribute::new(ElementType::Vertex, attrs::TYPE, AttrType::String)
                .description("Type of the vertex"),
            SchemaAttribute::new(ElementType::Vertex, attrs::SOURCE, AttrType::String)
                .description("Where the vertex's data came from"),
            SchemaAttribute::new(ElementType::Vertex, attrs::WEIGHT, AttrType::Float)
                .description("Relative importance of the vertex")
                .default(Value::Float64(1.0)),
            SchemaAttribute::new(ElementType::Vertex, attrs::X, AttrType::Float)
                .description("Horizontal layout coordinate")
                .default(Value::Float64(0.0)),
            SchemaAttribute::new(ElementType::Vertex, attrs::Y, AttrType::Float)
                .description("Vertical layout coordinate")
                .default(Value::Float64(0.0)),
            SchemaAttribute::new(ElementType::Transaction, attrs::TYPE, AttrType::String)
                .description("Type of the transaction"),
            SchemaAttribute::new(ElementType::Transaction, attrs::WEIGHT, AttrType::Float)
                .description("Strength of the transaction")
                .default(Value::Float64(1.0)),
            SchemaAttribute::new(ElementType::Transaction, attrs::SIMILARITY, AttrType::Float)
                .description("Score written by the similarity plugins"),
        ]
    }

    fn vertex_types(&self) -> Vec<ArcStr> {
        vec![literal!("unknown")]
    }

    fn transaction_types(&self) -> Vec<ArcStr> {
        vec![literal!("unknown"), literal!("similarity")]
    }
}
