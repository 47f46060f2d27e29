//! Versioned graph snapshots.
//!
//! A snapshot records the schema name and version it was written under,
//! the full attribute registry, and only the explicitly written values;
//! defaults are reproduced by the registry on load. Loading a snapshot
//! saved under an older schema version runs the update provider chain,
//! and fails without side effects when no chain exists.

use std::path::Path;

use serde::{Deserialize, Serialize};

use astral_common::types::{AttrType, ElementType, TransactionId, Value, VertexId};
use astral_common::{Error, Result};

use crate::graph::{AttributeId, GraphStore};
use crate::schema::versioning::UpdateRegistry;
use crate::schema::{Schema, SchemaFactory};

const FORMAT_VERSION: u16 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotAttribute {
    element_type: ElementType,
    name: String,
    attr_type: AttrType,
    description: String,
    default: Value,
}

#[derive(Serialize, Deserialize)]
struct SnapshotColumn {
    /// Index into [`Snapshot::attributes`].
    attribute: u32,
    /// Explicitly written values, keyed by raw element id.
    values: Vec<(u64, Value)>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotTransaction {
    id: u64,
    source: u64,
    destination: u64,
    directed: bool,
}

/// The serialized form of a graph.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    format_version: u16,
    schema_name: String,
    schema_version: u32,
    attributes: Vec<SnapshotAttribute>,
    vertices: Vec<u64>,
    transactions: Vec<SnapshotTransaction>,
    columns: Vec<SnapshotColumn>,
}

impl Snapshot {
    /// Captures a store under the given schema identity.
    pub fn capture(store: &GraphStore, schema: &Schema) -> Result<Self> {
        let mut attributes = Vec::new();
        let mut columns = Vec::new();
        let mut attr_ids: Vec<AttributeId> = Vec::new();
        for element_type in [
            ElementType::Graph,
            ElementType::Vertex,
            ElementType::Transaction,
        ] {
            for def in store.attributes(element_type) {
                attributes.push(SnapshotAttribute {
                    element_type: def.element_type(),
                    name: def.name().to_string(),
                    attr_type: def.attr_type(),
                    description: def.description().to_string(),
                    default: def.default().clone(),
                });
                attr_ids.push(def.id());
            }
        }
        for (index, &id) in attr_ids.iter().enumerate() {
            let values = store.explicit_values(id);
            if !values.is_empty() {
                columns.push(SnapshotColumn {
                    attribute: u32::try_from(index)
                        .map_err(|_| Error::Corrupt("too many attributes".to_string()))?,
                    values,
                });
            }
        }

        let transactions = store
            .transaction_ids()
            .into_iter()
            .filter_map(|t| store.transaction(t).map(|rec| (t, rec)))
            .map(|(t, rec)| SnapshotTransaction {
                id: t.as_u64(),
                source: rec.source().as_u64(),
                destination: rec.destination().as_u64(),
                directed: rec.is_directed(),
            })
            .collect();

        Ok(Self {
            format_version: FORMAT_VERSION,
            schema_name: schema.factory_name().to_string(),
            schema_version: schema.version(),
            attributes,
            vertices: store.vertex_ids().iter().map(|v| v.as_u64()).collect(),
            transactions,
            columns,
        })
    }

    /// The factory name recorded at save time.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The factory version recorded at save time.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Serializes to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Corrupt(e.to_string()))
    }

    /// Deserializes from bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (snapshot, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::Corrupt(e.to_string()))?;
        if snapshot.format_version != FORMAT_VERSION {
            return Err(Error::Corrupt(format!(
                "unsupported snapshot format version {}",
                snapshot.format_version
            )));
        }
        Ok(snapshot)
    }

    /// Rebuilds a store exactly as captured, without running migrations.
    pub fn restore(&self) -> Result<GraphStore> {
        let store = GraphStore::new();
        let mut attr_ids = Vec::with_capacity(self.attributes.len());
        for attr in &self.attributes {
            attr_ids.push(store.register_attribute(
                attr.element_type,
                &attr.name,
                attr.attr_type,
                &attr.description,
                attr.default.clone(),
            )?);
        }
        for &raw in &self.vertices {
            store.add_vertex_with_id(VertexId::new(raw))?;
        }
        for t in &self.transactions {
            store.add_transaction_with_id(
                TransactionId::new(t.id),
                VertexId::new(t.source),
                VertexId::new(t.destination),
                t.directed,
            )?;
        }
        for column in &self.columns {
            let index = column.attribute as usize;
            let def = self
                .attributes
                .get(index)
                .ok_or_else(|| Error::Corrupt(format!("bad attribute index {index}")))?;
            let id = attr_ids[index];
            for (raw, value) in &column.values {
                match def.element_type {
                    ElementType::Graph => store.set_graph_value(id, value.clone())?,
                    ElementType::Vertex => {
                        store.set_vertex_value(id, VertexId::new(*raw), value.clone())?;
                    }
                    ElementType::Transaction => {
                        store.set_transaction_value(id, TransactionId::new(*raw), value.clone())?;
                    }
                }
            }
        }
        Ok(store)
    }
}

/// Serializes a store under its schema.
pub fn write(store: &GraphStore, schema: &Schema) -> Result<Vec<u8>> {
    Snapshot::capture(store, schema)?.encode()
}

/// Rebuilds a store from bytes, migrating it to the factory's current
/// version when the snapshot is older.
///
/// Fails if the snapshot was written under a different factory, a newer
/// version, or a version with no update path. Nothing is returned on
/// failure, so the caller's current graph is untouched.
pub fn read(
    bytes: &[u8],
    factory: &dyn SchemaFactory,
    updates: &UpdateRegistry,
) -> Result<GraphStore> {
    let snapshot = Snapshot::decode(bytes)?;
    if snapshot.schema_name() != factory.name() {
        return Err(Error::Schema(format!(
            "graph was saved under schema '{}', expected '{}'",
            snapshot.schema_name(),
            factory.name()
        )));
    }
    let store = snapshot.restore()?;
    updates.update_to(
        &store,
        factory.name(),
        snapshot.schema_version(),
        factory.version(),
    )?;
    // Pick up attributes added since the snapshot was written.
    factory.create_schema().new_graph(&store)?;
    Ok(store)
}

/// Saves a store to a file.
pub fn save(store: &GraphStore, schema: &Schema, path: &Path) -> Result<()> {
    let bytes = write(store, schema)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Loads a store from a file, migrating as needed.
pub fn load(
    path: &Path,
    factory: &dyn SchemaFactory,
    updates: &UpdateRegistry,
) -> Result<GraphStore> {
    let bytes = std::fs::read(path)?;
    read(&bytes, factory, updates)
}
