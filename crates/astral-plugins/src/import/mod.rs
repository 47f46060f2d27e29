//! File import.
//!
//! Import runs in two stages. A format processor parses the file into a
//! [`RecordStore`] of string rows; parse problems with individual nodes
//! or edges are counted, not fatal. [`merge_record_store`] then folds the
//! rows into a graph, deduplicating vertices by identifier, converting
//! values to the registered attribute types, and running the schema
//! completion hooks.

mod gml;
mod graphml;
mod pajek;
mod record_store;

pub use gml::GmlImportProcessor;
pub use graphml::GraphMlImportProcessor;
pub use pajek::PajekImportProcessor;
pub use record_store::{keys, RecordStore};

use std::path::Path;

use tracing::warn;

use astral_common::types::{AttrType, ElementType, Value, VertexId};
use astral_common::utils::hash::FxHashMap;
use astral_common::{Error, Result};
use astral_core::{GraphStore, Schema};

use astral_core::schema::attrs;

/// A graph file format parser.
pub trait ImportProcessor: Send + Sync {
    /// Short format name ("graphml", ...).
    fn name(&self) -> &str;

    /// File extensions this processor handles, lowercase.
    fn extensions(&self) -> &'static [&'static str];

    /// Parses file text into records. Returns the number of nodes or
    /// edges that had to be skipped; only a malformed file as a whole is
    /// an error.
    fn parse(&self, text: &str, records: &mut RecordStore) -> Result<usize>;
}

/// What an import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Vertices created by the merge.
    pub vertices_created: usize,
    /// Transactions created by the merge.
    pub transactions_created: usize,
    /// Nodes or edges the processor had to skip.
    pub processing_errors: usize,
    /// Attribute values dropped because they did not parse as the
    /// attribute's type.
    pub values_skipped: usize,
}

/// Picks the processor for a file path by extension.
pub fn processor_for_path(path: &Path) -> Result<Box<dyn ImportProcessor>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    for processor in [
        Box::new(GraphMlImportProcessor) as Box<dyn ImportProcessor>,
        Box::new(GmlImportProcessor),
        Box::new(PajekImportProcessor),
    ] {
        if processor.extensions().contains(&extension.as_str()) {
            return Ok(processor);
        }
    }
    Err(Error::Import(format!(
        "no import processor for '{}'",
        path.display()
    )))
}

/// Parses text with a processor and merges the records into a graph.
pub fn import_str(
    processor: &dyn ImportProcessor,
    text: &str,
    store: &GraphStore,
    schema: &Schema,
) -> Result<ImportSummary> {
    let mut records = RecordStore::new();
    let processing_errors = processor.parse(text, &mut records)?;
    if processing_errors > 0 {
        warn!(
            format = processor.name(),
            skipped = processing_errors,
            "import skipped malformed elements"
        );
    }
    let mut summary = merge_record_store(&records, store, schema)?;
    summary.processing_errors = processing_errors;
    Ok(summary)
}

/// Folds records into the graph.
///
/// Vertices are deduplicated by identifier, against each other and
/// against vertices already in the graph. A row with a destination
/// becomes a transaction; one without is just a vertex.
pub fn merge_record_store(
    records: &RecordStore,
    store: &GraphStore,
    schema: &Schema,
) -> Result<ImportSummary> {
    let identifier = store.require_attribute(ElementType::Vertex, attrs::IDENTIFIER)?;
    let mut summary = ImportSummary::default();

    let mut by_identifier: FxHashMap<String, VertexId> = FxHashMap::default();
    for v in store.vertex_ids() {
        if let Some(existing) = store.vertex_value(identifier, v)?.as_str() {
            by_identifier.insert(existing.to_string(), v);
        }
    }

    for row in records.rows() {
        let source_identifier = row
            .iter()
            .find(|&&(k, _)| k == keys::SOURCE_IDENTIFIER)
            .map(|&(_, v)| v);
        let Some(source_identifier) = source_identifier else {
            summary.processing_errors += 1;
            continue;
        };

        let source = ensure_vertex(
            store,
            schema,
            identifier,
            &mut by_identifier,
            source_identifier,
            &mut summary,
        )?;
        for &(key, raw) in &row {
            if let Some(name) = key.strip_prefix(keys::SOURCE) {
                if name != attrs::IDENTIFIER {
                    apply_value(
                        store,
                        records,
                        key,
                        ElementType::Vertex,
                        name,
                        Element::Vertex(source),
                        raw,
                        &mut summary,
                    )?;
                }
            }
        }

        let destination_identifier = row
            .iter()
            .find(|&&(k, _)| k == keys::DESTINATION_IDENTIFIER)
            .map(|&(_, v)| v);
        let Some(destination_identifier) = destination_identifier else {
            continue;
        };

        let destination = ensure_vertex(
            store,
            schema,
            identifier,
            &mut by_identifier,
            destination_identifier,
            &mut summary,
        )?;
        for &(key, raw) in &row {
            if let Some(name) = key.strip_prefix(keys::DESTINATION) {
                if name != attrs::IDENTIFIER {
                    apply_value(
                        store,
                        records,
                        key,
                        ElementType::Vertex,
                        name,
                        Element::Vertex(destination),
                        raw,
                        &mut summary,
                    )?;
                }
            }
        }

        let directed = row
            .iter()
            .find(|&&(k, _)| k == keys::TRANSACTION_DIRECTED)
            .map_or(true, |&(_, v)| v != "false");
        let t = store.add_transaction(source, destination, directed)?;
        summary.transactions_created += 1;
        for &(key, raw) in &row {
            if let Some(name) = key.strip_prefix(keys::TRANSACTION) {
                if name != "directed" {
                    apply_value(
                        store,
                        records,
                        key,
                        ElementType::Transaction,
                        name,
                        Element::Transaction(t),
                        raw,
                        &mut summary,
                    )?;
                }
            }
        }
        schema.new_transaction(store, t)?;
    }

    schema.complete_graph(store)?;
    Ok(summary)
}

enum Element {
    Vertex(VertexId),
    Transaction(astral_common::types::TransactionId),
}

fn ensure_vertex(
    store: &GraphStore,
    schema: &Schema,
    identifier: astral_core::AttributeId,
    by_identifier: &mut FxHashMap<String, VertexId>,
    name: &str,
    summary: &mut ImportSummary,
) -> Result<VertexId> {
    if let Some(&v) = by_identifier.get(name) {
        return Ok(v);
    }
    let v = store.add_vertex();
    store.set_vertex_value(identifier, v, Value::String(name.into()))?;
    schema.new_vertex(store, v)?;
    by_identifier.insert(name.to_string(), v);
    summary.vertices_created += 1;
    Ok(v)
}

#[allow(clippy::too_many_arguments)]
fn apply_value(
    store: &GraphStore,
    records: &RecordStore,
    full_key: &str,
    element_type: ElementType,
    name: &str,
    element: Element,
    raw: &str,
    summary: &mut ImportSummary,
) -> Result<()> {
    let attr = match store.attribute_id(element_type, name) {
        Some(attr) => attr,
        None => {
            let declared = records
                .declared_type(full_key)
                .unwrap_or(AttrType::String);
            store.register_attribute(element_type, name, declared, "Imported attribute", Value::Null)?
        }
    };
    let attr_type = store
        .attribute_def(attr)
        .map_or(AttrType::String, |def| def.attr_type());
    let value = match attr_type.parse(raw) {
        Ok(value) => value,
        Err(_) => {
            summary.values_skipped += 1;
            return Ok(());
        }
    };
    match element {
        Element::Vertex(v) => store.set_vertex_value(attr, v, value)?,
        Element::Transaction(t) => store.set_transaction_value(attr, t, value)?,
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use astral_core::schema::AnalyticSchemaFactory;
    use astral_core::SchemaFactory;

    use super::*;

    pub fn analytic_store() -> (GraphStore, Schema) {
        let store = GraphStore::new();
        let schema = AnalyticSchemaFactory.create_schema();
        schema.new_graph(&store).unwrap();
        (store, schema)
    }

    pub fn identifier_of(store: &GraphStore, v: VertexId) -> String {
        let attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        match store.vertex_value(attr, v).unwrap() {
            Value::String(s) => s.to_string(),
            other => panic!("identifier was {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_merge_creates_vertices_and_transactions() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.set(keys::DESTINATION_IDENTIFIER, "b").unwrap();
        records.set(keys::TRANSACTION_IDENTIFIER, "e1").unwrap();

        let summary = merge_record_store(&records, &store, &schema).unwrap();
        assert_eq!(summary.vertices_created, 2);
        assert_eq!(summary.transactions_created, 1);
        assert_eq!(store.vertex_count(), 2);
        assert_eq!(store.transaction_count(), 1);
    }

    #[test]
    fn test_merge_dedupes_against_existing_graph() {
        let (store, schema) = analytic_store();
        let existing = store.add_vertex();
        let identifier = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        store
            .set_vertex_value(identifier, existing, Value::String("a".into()))
            .unwrap();

        let mut records = RecordStore::new();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.set(keys::DESTINATION_IDENTIFIER, "b").unwrap();

        let summary = merge_record_store(&records, &store, &schema).unwrap();
        assert_eq!(summary.vertices_created, 1);
        assert_eq!(store.vertex_count(), 2);
        let t = store.transaction_ids()[0];
        assert_eq!(store.transaction(t).unwrap().source(), existing);
    }

    #[test]
    fn test_merge_converts_declared_types() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.declare_type("source.age", AttrType::Integer);
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.set("source.age", "41").unwrap();
        records.set("source.weight", "2.5").unwrap();

        merge_record_store(&records, &store, &schema).unwrap();

        let v = store.vertex_ids()[0];
        let age = store.attribute_id(ElementType::Vertex, "age").unwrap();
        assert_eq!(store.vertex_value(age, v).unwrap(), Value::Int64(41));
        // weight is already registered as Float by the schema.
        let weight = store
            .attribute_id(ElementType::Vertex, attrs::WEIGHT)
            .unwrap();
        assert_eq!(store.vertex_value(weight, v).unwrap(), Value::Float64(2.5));
    }

    #[test]
    fn test_unparseable_values_are_counted_not_fatal() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.set("source.weight", "heavy").unwrap();

        let summary = merge_record_store(&records, &store, &schema).unwrap();
        assert_eq!(summary.values_skipped, 1);
        assert_eq!(store.vertex_count(), 1);
    }

    #[test]
    fn test_row_without_source_identifier_is_an_error() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.add();
        records.set("source.label", "orphan").unwrap();

        let summary = merge_record_store(&records, &store, &schema).unwrap();
        assert_eq!(summary.processing_errors, 1);
        assert_eq!(store.vertex_count(), 0);
    }

    #[test]
    fn test_undirected_flag() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        records.set(keys::DESTINATION_IDENTIFIER, "b").unwrap();
        records.set(keys::TRANSACTION_DIRECTED, "false").unwrap();

        merge_record_store(&records, &store, &schema).unwrap();
        let t = store.transaction_ids()[0];
        assert!(!store.transaction(t).unwrap().is_directed());
    }

    #[test]
    fn test_completion_fills_types() {
        let (store, schema) = analytic_store();
        let mut records = RecordStore::new();
        records.add();
        records.set(keys::SOURCE_IDENTIFIER, "a").unwrap();
        merge_record_store(&records, &store, &schema).unwrap();

        let vtype = store.attribute_id(ElementType::Vertex, attrs::TYPE).unwrap();
        let v = store.vertex_ids()[0];
        assert_eq!(
            store.vertex_value(vtype, v).unwrap(),
            Value::String("unknown".into())
        );
    }

    #[test]
    fn test_processor_dispatch_by_extension() {
        assert_eq!(
            processor_for_path(Path::new("graph.graphml")).unwrap().name(),
            "graphml"
        );
        assert_eq!(
            processor_for_path(Path::new("graph.gml")).unwrap().name(),
            "gml"
        );
        assert_eq!(
            processor_for_path(Path::new("graph.net")).unwrap().name(),
            "pajek"
        );
        assert!(processor_for_path(Path::new("graph.xlsx")).is_err());
    }
}
