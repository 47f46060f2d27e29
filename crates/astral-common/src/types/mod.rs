//! Identifier types and dynamic values for graph elements.

mod id;
mod value;

pub use id::{GraphId, TransactionId, VertexId};
pub use value::{AttrType, HashableValue, Value};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of graph element an attribute or find operation applies to.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ElementType {
    /// The graph itself (graph-level attributes).
    Graph,
    /// A vertex.
    Vertex,
    /// A transaction (an edge instance between two vertices).
    Transaction,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph => write!(f, "graph"),
            Self::Vertex => write!(f, "vertex"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}
