//! Schema attribute declarations and the concept trait.

use arcstr::ArcStr;
use astral_common::types::{AttrType, ElementType, Value};
use astral_common::Result;

use crate::graph::{AttributeId, GraphStore};

/// One attribute declaration inside a schema concept.
///
/// Built with chained setters:
///
/// ```
/// use astral_common::types::{AttrType, ElementType, Value};
/// use astral_core::SchemaAttribute;
///
/// let weight = SchemaAttribute::new(ElementType::Vertex, "weight", AttrType::Float)
///     .description("Relative importance of the vertex")
///     .default(Value::Float64(1.0));
/// assert_eq!(weight.name(), "weight");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaAttribute {
    element_type: ElementType,
    name: ArcStr,
    attr_type: AttrType,
    description: ArcStr,
    default: Value,
}

impl SchemaAttribute {
    /// Starts a declaration with an empty description and a null default.
    #[must_use]
    pub fn new(element_type: ElementType, name: &str, attr_type: AttrType) -> Self {
        Self {
            element_type,
            name: ArcStr::from(name),
            attr_type,
            description: ArcStr::new(),
            default: Value::Null,
        }
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = ArcStr::from(description);
        self
    }

    /// Sets the value unset elements read.
    #[must_use]
    pub fn default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default
    }

    /// Registers this declaration on a store, returning the attribute id.
    /// Idempotent for identical declarations.
    pub fn ensure(&self, store: &GraphStore) -> Result<AttributeId> {
        store.register_attribute(
            self.element_type,
            &self.name,
            self.attr_type,
            &self.description,
            self.default.clone(),
        )
    }
}

/// A named group of attribute and element-type declarations.
///
/// Concepts compose: a factory stacks several of them into one schema.
pub trait SchemaConcept: Send + Sync {
    /// Stable concept name.
    fn name(&self) -> &str;

    /// The attributes this concept declares.
    fn attributes(&self) -> Vec<SchemaAttribute>;

    /// Vertex type names this concept introduces.
    fn vertex_types(&self) -> Vec<ArcStr> {
        Vec::new()
    }

    /// Transaction type names this concept introduces.
    fn transaction_types(&self) -> Vec<ArcStr> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_is_idempotent() {
        let store = GraphStore::new();
        let attr = SchemaAttribute::new(ElementType::Vertex, "weight", AttrType::Float)
            .default(Value::Float64(1.0));

        let a = attr.ensure(&store).unwrap();
        let b = attr.ensure(&store).unwrap();
        assert_eq!(a, b);

        let v = store.add_vertex();
        assert_eq!(store.vertex_value(a, v).unwrap(), Value::Float64(1.0));
    }
}
