//! The graph store.
//!
//! Interior mutability throughout: every collection sits behind its own
//! `parking_lot::RwLock`, so a shared `&GraphStore` supports concurrent
//! readers with short exclusive sections for writes.
//!
//! Lock ordering (acquire strictly in this order, never the reverse):
//! vertices -> transactions -> forward -> backward -> registry -> values.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use smallvec::SmallVec;

use astral_common::types::{AttrType, ElementType, Value, VertexId};
use astral_common::types::TransactionId;
use astral_common::utils::hash::{FxHashMap, FxHashSet};
use astral_common::{Error, Result};

use super::attribute::{AttributeDef, AttributeId, AttributeRegistry};
use super::ConnectionMode;

/// Raw id under which graph-level attribute values are stored.
const GRAPH_ELEMENT_ID: u64 = 0;

type AdjacencyList = SmallVec<[(VertexId, TransactionId); 4]>;

/// Tuning knobs for a [`GraphStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maintain a reverse adjacency index for incoming transactions.
    /// Without it, incoming queries scan the transaction table.
    pub backward_edges: bool,
    /// Initial capacity of the vertex set.
    pub initial_vertex_capacity: usize,
    /// Initial capacity of the transaction table.
    pub initial_transaction_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backward_edges: true,
            initial_vertex_capacity: 1024,
            initial_transaction_capacity: 4096,
        }
    }
}

/// Endpoints and orientation of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    source: VertexId,
    destination: VertexId,
    directed: bool,
}

impl TransactionRecord {
    #[must_use]
    pub const fn source(&self) -> VertexId {
        self.source
    }

    #[must_use]
    pub const fn destination(&self) -> VertexId {
        self.destination
    }

    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// The endpoint that is not `v`, or `v` itself for a loop.
    #[must_use]
    pub fn other_end(&self, v: VertexId) -> VertexId {
        if self.source == v {
            self.destination
        } else {
            self.source
        }
    }
}

/// An attributed multigraph.
///
/// Vertices and transactions get dense ids from atomic counters; ids are
/// never reused within one store. All id listings come back sorted so
/// iteration order is deterministic.
pub struct GraphStore {
    config: StoreConfig,
    vertices: RwLock<FxHashSet<VertexId>>,
    transactions: RwLock<FxHashMap<TransactionId, TransactionRecord>>,
    forward: RwLock<FxHashMap<VertexId, AdjacencyList>>,
    backward: Option<RwLock<FxHashMap<VertexId, AdjacencyList>>>,
    registry: RwLock<AttributeRegistry>,
    values: RwLock<FxHashMap<AttributeId, FxHashMap<u64, Value>>>,
    next_vertex_id: AtomicU64,
    next_transaction_id: AtomicU64,
}

impl GraphStore {
    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let vertices = FxHashSet::with_capacity_and_hasher(
            config.initial_vertex_capacity,
            Default::default(),
        );
        let transactions = FxHashMap::with_capacity_and_hasher(
            config.initial_transaction_capacity,
            Default::default(),
        );
        let backward = config
            .backward_edges
            .then(|| RwLock::new(FxHashMap::default()));
        Self {
            config,
            vertices: RwLock::new(vertices),
            transactions: RwLock::new(transactions),
            forward: RwLock::new(FxHashMap::default()),
            backward,
            registry: RwLock::new(AttributeRegistry::new()),
            values: RwLock::new(FxHashMap::default()),
            next_vertex_id: AtomicU64::new(0),
            next_transaction_id: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- vertices ---

    /// Adds a vertex and returns its id.
    pub fn add_vertex(&self) -> VertexId {
        let id = VertexId::new(self.next_vertex_id.fetch_add(1, Ordering::Relaxed));
        self.vertices.write().insert(id);
        id
    }

    /// Re-inserts a vertex under a known id. Used when rebuilding a store
    /// from a snapshot or merging imported records.
    pub(crate) fn add_vertex_with_id(&self, id: VertexId) -> Result<()> {
        if !id.is_valid() {
            return Err(Error::not_found(ElementType::Vertex, id.as_u64()));
        }
        if !self.vertices.write().insert(id) {
            return Err(Error::Attribute(format!("vertex {id} already exists")));
        }
        self.next_vertex_id.fetch_max(id.as_u64() + 1, Ordering::Relaxed);
        Ok(())
    }

    #[must_use]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.vertices.read().contains(&v)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.read().len()
    }

    /// All vertex ids, sorted ascending.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self.vertices.read().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Removes a vertex along with its incident transactions and all
    /// attribute values written on either.
    pub fn remove_vertex(&self, v: VertexId) -> Result<()> {
        let mut vertices = self.vertices.write();
        if !vertices.remove(&v) {
            return Err(Error::not_found(ElementType::Vertex, v.as_u64()));
        }
        let mut transactions = self.transactions.write();
        let incident: Vec<TransactionId> = transactions
            .iter()
            .filter(|(_, rec)| rec.source == v || rec.destination == v)
            .map(|(&tid, _)| tid)
            .collect();
        for tid in &incident {
            transactions.remove(tid);
        }

        let mut forward = self.forward.write();
        forward.remove(&v);
        for list in forward.values_mut() {
            list.retain(|(_, tid)| !incident.contains(tid));
        }
        if let Some(backward) = &self.backward {
            let mut backward = backward.write();
            backward.remove(&v);
            for list in backward.values_mut() {
                list.retain(|(_, tid)| !incident.contains(tid));
            }
        }
        drop(forward);

        let registry = self.registry.read();
        let mut values = self.values.write();
        for def in registry.all() {
            let Some(column) = values.get_mut(&def.id()) else {
                continue;
            };
            match def.element_type() {
                ElementType::Vertex => {
                    column.remove(&v.as_u64());
                }
                ElementType::Transaction => {
                    for tid in &incident {
                        column.remove(&tid.as_u64());
                    }
                }
                ElementType::Graph => {}
            }
        }
        Ok(())
    }

    // --- transactions ---

    /// Adds a transaction between two existing vertices.
    pub fn add_transaction(
        &self,
        source: VertexId,
        destination: VertexId,
        directed: bool,
    ) -> Result<TransactionId> {
        let id = TransactionId::new(self.next_transaction_id.fetch_add(1, Ordering::Relaxed));
        self.insert_transaction(id, source, destination, directed)?;
        Ok(id)
    }

    /// Re-inserts a transaction under a known id.
    pub(crate) fn add_transaction_with_id(
        &self,
        id: TransactionId,
        source: VertexId,
        destination: VertexId,
        directed: bool,
    ) -> Result<()> {
        if self.transactions.read().contains_key(&id) {
            return Err(Error::Attribute(format!("transaction {id} already exists")));
        }
        self.insert_transaction(id, source, destination, directed)?;
        self.next_transaction_id
            .fetch_max(id.as_u64() + 1, Ordering::Relaxed);
        Ok(())
    }

    fn insert_transaction(
        &self,
        id: TransactionId,
        source: VertexId,
        destination: VertexId,
        directed: bool,
    ) -> Result<()> {
        {
            let vertices = self.vertices.read();
            if !vertices.contains(&source) {
                return Err(Error::not_found(ElementType::Vertex, source.as_u64()));
            }
            if !vertices.contains(&destination) {
                return Err(Error::not_found(ElementType::Vertex, destination.as_u64()));
            }
        }
        self.transactions.write().insert(
            id,
            TransactionRecord {
                source,
                destination,
                directed,
            },
        );
        self.forward
            .write()
            .entry(source)
            .or_default()
            .push((destination, id));
        if let Some(backward) = &self.backward {
            backward
                .write()
                .entry(destination)
                .or_default()
                .push((source, id));
        }
        Ok(())
    }

    #[must_use]
    pub fn has_transaction(&self, t: TransactionId) -> bool {
        self.transactions.read().contains_key(&t)
    }

    /// Returns a transaction's endpoints and orientation.
    #[must_use]
    pub fn transaction(&self, t: TransactionId) -> Option<TransactionRecord> {
        self.transactions.read().get(&t).copied()
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }

    /// All transaction ids, sorted ascending.
    #[must_use]
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.transactions.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Removes a transaction and its attribute values.
    pub fn remove_transaction(&self, t: TransactionId) -> Result<()> {
        let rec = self
            .transactions
            .write()
            .remove(&t)
            .ok_or_else(|| Error::not_found(ElementType::Transaction, t.as_u64()))?;

        let mut forward = self.forward.write();
        if let Some(list) = forward.get_mut(&rec.source) {
            list.retain(|&mut (_, tid)| tid != t);
        }
        drop(forward);
        if let Some(backward) = &self.backward {
            let mut backward = backward.write();
            if let Some(list) = backward.get_mut(&rec.destination) {
                list.retain(|&mut (_, tid)| tid != t);
            }
        }

        let registry = self.registry.read();
        let mut values = self.values.write();
        for def in registry.all() {
            if def.element_type() == ElementType::Transaction {
                if let Some(column) = values.get_mut(&def.id()) {
                    column.remove(&t.as_u64());
                }
            }
        }
        Ok(())
    }

    /// All transactions whose endpoints are `a` and `b`, in either
    /// orientation. Sorted ascending.
    #[must_use]
    pub fn transactions_between(&self, a: VertexId, b: VertexId) -> Vec<TransactionId> {
        let forward = self.forward.read();
        let mut out = Vec::new();
        if let Some(list) = forward.get(&a) {
            out.extend(list.iter().filter(|&&(dst, _)| dst == b).map(|&(_, tid)| tid));
        }
        if a != b {
            if let Some(list) = forward.get(&b) {
                out.extend(list.iter().filter(|&&(dst, _)| dst == a).map(|&(_, tid)| tid));
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    // --- adjacency ---

    /// All (neighbour, transaction) pairs reachable from `v` under `mode`.
    ///
    /// Loops appear once. Sorted ascending, no duplicate pairs.
    #[must_use]
    pub fn adjacent(&self, v: VertexId, mode: ConnectionMode) -> Vec<(VertexId, TransactionId)> {
        let mut out = Vec::new();
        if mode.is_empty() {
            return out;
        }
        let transactions = self.transactions.read();
        let forward = self.forward.read();
        if let Some(list) = forward.get(&v) {
            for &(dst, tid) in list.iter() {
                if let Some(rec) = transactions.get(&tid) {
                    let take = if rec.directed {
                        mode.outgoing
                    } else {
                        mode.undirected
                    };
                    if take {
                        out.push((dst, tid));
                    }
                }
            }
        }
        if mode.incoming || mode.undirected {
            match &self.backward {
                Some(backward) => {
                    let backward = backward.read();
                    if let Some(list) = backward.get(&v) {
                        for &(src, tid) in list.iter() {
                            if let Some(rec) = transactions.get(&tid) {
                                let take = if rec.directed {
                                    mode.incoming
                                } else {
                                    mode.undirected
                                };
                                if take {
                                    out.push((src, tid));
                                }
                            }
                        }
                    }
                }
                None => {
                    for (&tid, rec) in transactions.iter() {
                        if rec.destination == v {
                            let take = if rec.directed {
                                mode.incoming
                            } else {
                                mode.undirected
                            };
                            if take {
                                out.push((rec.source, tid));
                            }
                        }
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Distinct neighbours of `v` under `mode`, excluding `v` itself.
    /// Sorted ascending.
    #[must_use]
    pub fn neighbours(&self, v: VertexId, mode: ConnectionMode) -> Vec<VertexId> {
        let mut out: Vec<VertexId> = self
            .adjacent(v, mode)
            .into_iter()
            .map(|(w, _)| w)
            .filter(|&w| w != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of transactions incident to `v` under `mode`, loops included.
    #[must_use]
    pub fn degree(&self, v: VertexId, mode: ConnectionMode) -> usize {
        self.adjacent(v, mode).len()
    }

    // --- attributes ---

    /// Declares an attribute, or returns the existing id for an identical
    /// declaration.
    pub fn register_attribute(
        &self,
        element_type: ElementType,
        name: &str,
        attr_type: AttrType,
        description: &str,
        default: Value,
    ) -> Result<AttributeId> {
        self.registry
            .write()
            .register(element_type, name, attr_type, description, default)
    }

    #[must_use]
    pub fn attribute_id(&self, element_type: ElementType, name: &str) -> Option<AttributeId> {
        self.registry.read().lookup(element_type, name)
    }

    /// Like [`attribute_id`](Self::attribute_id), but errors with a spelling
    /// suggestion when the attribute is unknown.
    pub fn require_attribute(&self, element_type: ElementType, name: &str) -> Result<AttributeId> {
        self.registry.read().require(element_type, name)
    }

    #[must_use]
    pub fn attribute_def(&self, id: AttributeId) -> Option<AttributeDef> {
        self.registry.read().def(id).cloned()
    }

    /// All attribute definitions for one element type, in registration order.
    #[must_use]
    pub fn attributes(&self, element_type: ElementType) -> Vec<AttributeDef> {
        self.registry.read().defs_for(element_type)
    }

    /// Reads a vertex attribute, falling back to the registered default
    /// when nothing has been written.
    pub fn vertex_value(&self, attr: AttributeId, v: VertexId) -> Result<Value> {
        if !self.has_vertex(v) {
            return Err(Error::not_found(ElementType::Vertex, v.as_u64()));
        }
        self.read_value(ElementType::Vertex, attr, v.as_u64())
    }

    /// Writes a vertex attribute. Writing [`Value::Null`] clears it back
    /// to the default.
    pub fn set_vertex_value(&self, attr: AttributeId, v: VertexId, value: Value) -> Result<()> {
        if !self.has_vertex(v) {
            return Err(Error::not_found(ElementType::Vertex, v.as_u64()));
        }
        self.write_value(ElementType::Vertex, attr, v.as_u64(), value)
    }

    /// Clears a vertex attribute back to the default.
    pub fn clear_vertex_value(&self, attr: AttributeId, v: VertexId) -> Result<()> {
        self.set_vertex_value(attr, v, Value::Null)
    }

    /// Reads a transaction attribute, falling back to the registered default.
    pub fn transaction_value(&self, attr: AttributeId, t: TransactionId) -> Result<Value> {
        if !self.has_transaction(t) {
            return Err(Error::not_found(ElementType::Transaction, t.as_u64()));
        }
        self.read_value(ElementType::Transaction, attr, t.as_u64())
    }

    /// Writes a transaction attribute.
    pub fn set_transaction_value(
        &self,
        attr: AttributeId,
        t: TransactionId,
        value: Value,
    ) -> Result<()> {
        if !self.has_transaction(t) {
            return Err(Error::not_found(ElementType::Transaction, t.as_u64()));
        }
        self.write_value(ElementType::Transaction, attr, t.as_u64(), value)
    }

    /// Clears a transaction attribute back to the default.
    pub fn clear_transaction_value(&self, attr: AttributeId, t: TransactionId) -> Result<()> {
        self.set_transaction_value(attr, t, Value::Null)
    }

    /// Reads a graph-level attribute.
    pub fn graph_value(&self, attr: AttributeId) -> Result<Value> {
        self.read_value(ElementType::Graph, attr, GRAPH_ELEMENT_ID)
    }

    /// Writes a graph-level attribute.
    pub fn set_graph_value(&self, attr: AttributeId, value: Value) -> Result<()> {
        self.write_value(ElementType::Graph, attr, GRAPH_ELEMENT_ID, value)
    }

    /// Writes the same value on every vertex. Used by bulk operations such
    /// as select-all.
    pub fn set_all_vertices(&self, attr: AttributeId, value: Value) -> Result<()> {
        for v in self.vertex_ids() {
            self.set_vertex_value(attr, v, value.clone())?;
        }
        Ok(())
    }

    /// Writes the same value on every transaction.
    pub fn set_all_transactions(&self, attr: AttributeId, value: Value) -> Result<()> {
        for t in self.transaction_ids() {
            self.set_transaction_value(attr, t, value.clone())?;
        }
        Ok(())
    }

    /// Renames an attribute in place. Stored values keep their id and are
    /// unaffected.
    pub fn rename_attribute(&self, id: AttributeId, new_name: &str) -> Result<()> {
        self.registry.write().rename(id, new_name)
    }

    /// Changes an attribute's value type, converting every stored value.
    /// Values that cannot be converted are cleared back to the new default.
    pub fn retype_attribute(&self, id: AttributeId, new_type: AttrType) -> Result<()> {
        let mut registry = self.registry.write();
        registry.retype(id, new_type)?;
        drop(registry);

        let mut values = self.values.write();
        if let Some(column) = values.get_mut(&id) {
            let converted: FxHashMap<u64, Value> = column
                .iter()
                .filter_map(|(&raw, value)| {
                    value.convert_to(new_type).map(|v| (raw, v))
                })
                .collect();
            *column = converted;
        }
        Ok(())
    }

    /// Explicitly written values for one attribute, keyed by raw element
    /// id and sorted. Defaults are not included.
    pub(crate) fn explicit_values(&self, attr: AttributeId) -> Vec<(u64, Value)> {
        let values = self.values.read();
        let mut out: Vec<(u64, Value)> = values
            .get(&attr)
            .map(|column| column.iter().map(|(&raw, v)| (raw, v.clone())).collect())
            .unwrap_or_default();
        out.sort_unstable_by_key(|&(raw, _)| raw);
        out
    }

    fn read_value(&self, element_type: ElementType, attr: AttributeId, raw: u64) -> Result<Value> {
        let registry = self.registry.read();
        let def = registry
            .def(attr)
            .ok_or_else(|| Error::Attribute(format!("unknown attribute id {}", attr.as_u32())))?;
        if def.element_type() != element_type {
            return Err(Error::Attribute(format!(
                "attribute '{}' is a {} attribute, not a {element_type} attribute",
                def.name(),
                def.element_type()
            )));
        }
        let values = self.values.read();
        Ok(values
            .get(&attr)
            .and_then(|column| column.get(&raw))
            .cloned()
            .unwrap_or_else(|| def.default().clone()))
    }

    fn write_value(
        &self,
        element_type: ElementType,
        attr: AttributeId,
        raw: u64,
        value: Value,
    ) -> Result<()> {
        let registry = self.registry.read();
        let def = registry
            .def(attr)
            .ok_or_else(|| Error::Attribute(format!("unknown attribute id {}", attr.as_u32())))?;
        if def.element_type() != element_type {
            return Err(Error::Attribute(format!(
                "attribute '{}' is a {} attribute, not a {element_type} attribute",
                def.name(),
                def.element_type()
            )));
        }
        if !def.attr_type().accepts(&value) {
            return Err(Error::Attribute(format!(
                "attribute '{}' holds {} values, got {}",
                def.name(),
                def.attr_type().name(),
                value.type_name()
            )));
        }
        let mut values = self.values.write();
        if value == Value::Null {
            if let Some(column) = values.get_mut(&attr) {
                column.remove(&raw);
            }
        } else {
            values.entry(attr).or_default().insert(raw, value);
        }
        Ok(())
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("vertices", &self.vertex_count())
            .field("transactions", &self.transaction_count())
            .finish_non_exhaustive()
    }
}
