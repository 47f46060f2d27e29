//! Attributed multigraph store and schema framework.
//!
//! [`GraphStore`](graph::GraphStore) holds vertices, transactions, and their
//! typed attributes. The [`schema`] module layers domain rulesets on top:
//! concepts declare attributes, factories bundle concepts, and update
//! providers migrate saved graphs across schema versions. [`snapshot`]
//! handles the versioned save format.

pub mod graph;
pub mod schema;
pub mod snapshot;

pub use graph::{AttributeId, ConnectionMode, GraphStore, StoreConfig};
pub use schema::{Schema, SchemaAttribute, SchemaConcept, SchemaFactory};
