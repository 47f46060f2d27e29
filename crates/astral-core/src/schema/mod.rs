//! Schemas: named rulesets layered on top of a bare graph.
//!
//! A [`SchemaConcept`] declares a coherent group of attributes and element
//! types. A [`SchemaFactory`] bundles concepts into a versioned [`Schema`],
//! which registers the merged attributes on a store and runs the element
//! lifecycle hooks. The [`versioning`] module migrates graphs saved under
//! older factory versions.

mod concept;
mod concepts;
mod factory;
pub mod versioning;

pub use concept::{SchemaAttribute, SchemaConcept};
pub use concepts::{attrs, AnalyticConcept, BaseConcept};
pub use factory::{AnalyticSchemaFactory, FactoryRegistry, SchemaFactory, ANALYTIC_SCHEMA_NAME};

use arcstr::ArcStr;
use astral_common::types::{ElementType, TransactionId, Value, VertexId};
use astral_common::Result;

use crate::graph::GraphStore;

/// A versioned, merged set of schema concepts.
///
/// Built by a [`SchemaFactory`]; the first concept to declare an attribute
/// name wins, so base concepts take precedence over the ones layered on
/// top of them.
pub struct Schema {
    factory_name: ArcStr,
    version: u32,
    attributes: Vec<SchemaAttribute>,
    vertex_types: Vec<ArcStr>,
    transaction_types: Vec<ArcStr>,
}

impl Schema {
    pub(crate) fn from_concepts(
        factory_name: &str,
        version: u32,
        concepts: &[Box<dyn SchemaConcept>],
    ) -> Self {
        let mut attributes: Vec<SchemaAttribute> = Vec::new();
        let mut vertex_types = Vec::new();
        let mut transaction_types = Vec::new();
        for concept in concepts {
            for attr in concept.attributes() {
                let duplicate = attributes
                    .iter()
                    .any(|a| a.element_type() == attr.element_type() && a.name() == attr.name());
                if !duplicate {
                    attributes.push(attr);
                }
            }
            vertex_types.extend(concept.vertex_types());
            transaction_types.extend(concept.transaction_types());
        }
        vertex_types.dedup();
        transaction_types.dedup();
        Self {
            factory_name: ArcStr::from(factory_name),
            version,
            attributes,
            vertex_types,
            transaction_types,
        }
    }

    /// Name of the factory that built this schema.
    #[must_use]
    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// The merged attribute declarations, optionally filtered by element
    /// type.
    #[must_use]
    pub fn attributes(&self, element_type: Option<ElementType>) -> Vec<&SchemaAttribute> {
        self.attributes
            .iter()
            .filter(|a| element_type.map_or(true, |et| a.element_type() == et))
            .collect()
    }

    /// Vertex type names the schema knows about.
    #[must_use]
    pub fn vertex_types(&self) -> &[ArcStr] {
        &self.vertex_types
    }

    /// Transaction type names the schema knows about.
    #[must_use]
    pub fn transaction_types(&self) -> &[ArcStr] {
        &self.transaction_types
    }

    /// Registers every declared attribute on a freshly created graph.
    pub fn new_graph(&self, store: &GraphStore) -> Result<()> {
        for attr in &self.attributes {
            attr.ensure(store)?;
        }
        Ok(())
    }

    /// Initialises a newly added vertex: the identifier defaults to the
    /// vertex id rendered as a string.
    pub fn new_vertex(&self, store: &GraphStore, v: VertexId) -> Result<()> {
        if let Some(attr) = store.attribute_id(ElementType::Vertex, attrs::IDENTIFIER) {
            if store.vertex_value(attr, v)? == Value::Null {
                store.set_vertex_value(attr, v, Value::String(v.to_string().into()))?;
            }
        }
        Ok(())
    }

    /// Initialises a newly added transaction.
    pub fn new_transaction(&self, store: &GraphStore, t: TransactionId) -> Result<()> {
        if let Some(attr) = store.attribute_id(ElementType::Transaction, attrs::IDENTIFIER) {
            if store.transaction_value(attr, t)? == Value::Null {
                store.set_transaction_value(attr, t, Value::String(t.to_string().into()))?;
            }
        }
        Ok(())
    }

    /// Fills in a vertex after a bulk change: a blank type becomes
    /// `"unknown"`.
    pub fn complete_vertex(&self, store: &GraphStore, v: VertexId) -> Result<()> {
        if let Some(attr) = store.attribute_id(ElementType::Vertex, attrs::TYPE) {
            if is_blank(&store.vertex_value(attr, v)?) {
                store.set_vertex_value(attr, v, Value::String(attrs::TYPE_UNKNOWN.into()))?;
            }
        }
        Ok(())
    }

    /// Fills in a transaction after a bulk change.
    pub fn complete_transaction(&self, store: &GraphStore, t: TransactionId) -> Result<()> {
        if let Some(attr) = store.attribute_id(ElementType::Transaction, attrs::TYPE) {
            if is_blank(&store.transaction_value(attr, t)?) {
                store.set_transaction_value(attr, t, Value::String(attrs::TYPE_UNKNOWN.into()))?;
            }
        }
        Ok(())
    }

    /// Runs the completion hooks over every element. Called after imports
    /// and plugin runs that touched many elements.
    pub fn complete_graph(&self, store: &GraphStore) -> Result<()> {
        for v in store.vertex_ids() {
            self.complete_vertex(store, v)?;
        }
        for t in store.transaction_ids() {
            self.complete_transaction(store, t)?;
        }
        Ok(())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("factory", &self.factory_name)
            .field("version", &self.version)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_common::types::AttrType;

    fn analytic() -> (GraphStore, Schema) {
        let store = GraphStore::new();
        let schema = AnalyticSchemaFactory.create_schema();
        schema.new_graph(&store).unwrap();
        (store, schema)
    }

    #[test]
    fn test_new_graph_registers_attributes() {
        let (store, schema) = analytic();
        assert!(store.attribute_id(ElementType::Vertex, attrs::IDENTIFIER).is_some());
        assert!(store.attribute_id(ElementType::Vertex, attrs::SELECTED).is_some());
        assert!(store.attribute_id(ElementType::Transaction, attrs::SIMILARITY).is_some());
        assert!(!schema.attributes(Some(ElementType::Vertex)).is_empty());
    }

    #[test]
    fn test_new_vertex_sets_identifier() {
        let (store, schema) = analytic();
        let v = store.add_vertex();
        schema.new_vertex(&store, v).unwrap();

        let id_attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        assert_eq!(
            store.vertex_value(id_attr, v).unwrap(),
            Value::String(v.to_string().into())
        );
    }

    #[test]
    fn test_new_vertex_keeps_existing_identifier() {
        let (store, schema) = analytic();
        let v = store.add_vertex();
        let id_attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        store
            .set_vertex_value(id_attr, v, Value::String("alpha".into()))
            .unwrap();
        schema.new_vertex(&store, v).unwrap();
        assert_eq!(
            store.vertex_value(id_attr, v).unwrap(),
            Value::String("alpha".into())
        );
    }

    #[test]
    fn test_complete_fills_unknown_type() {
        let (store, schema) = analytic();
        let v = store.add_vertex();
        let w = store.add_vertex();
        let t = store.add_transaction(v, w, true).unwrap();
        let vtype = store.attribute_id(ElementType::Vertex, attrs::TYPE).unwrap();
        store
            .set_vertex_value(vtype, w, Value::String("person".into()))
            .unwrap();

        schema.complete_graph(&store).unwrap();

        assert_eq!(
            store.vertex_value(vtype, v).unwrap(),
            Value::String(attrs::TYPE_UNKNOWN.into())
        );
        assert_eq!(
            store.vertex_value(vtype, w).unwrap(),
            Value::String("person".into())
        );
        let ttype = store
            .attribute_id(ElementType::Transaction, attrs::TYPE)
            .unwrap();
        assert_eq!(
            store.transaction_value(ttype, t).unwrap(),
            Value::String(attrs::TYPE_UNKNOWN.into())
        );
    }

    #[test]
    fn test_first_concept_wins_on_duplicate_names() {
        struct Narrow;
        impl SchemaConcept for Narrow {
            fn name(&self) -> &str {
                "narrow"
            }
            fn attributes(&self) -> Vec<SchemaAttribute> {
                vec![SchemaAttribute::new(
                    ElementType::Vertex,
                    attrs::WEIGHT,
                    AttrType::Integer,
                )]
            }
        }

        let concepts: Vec<Box<dyn SchemaConcept>> =
            vec![Box::new(AnalyticConcept), Box::new(Narrow)];
        let schema = Schema::from_concepts("test", 1, &concepts);
        let weight = schema
            .attributes(Some(ElementType::Vertex))
            .into_iter()
            .find(|a| a.name() == attrs::WEIGHT)
            .unwrap();
        assert_eq!(weight.attr_type(), AttrType::Float);
    }
}
