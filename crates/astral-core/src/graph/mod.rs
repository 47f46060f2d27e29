//! The attributed multigraph.
//!
//! A graph is a set of vertices connected by transactions. A transaction is
//! either directed (source to destination) or undirected, and any number of
//! transactions may connect the same vertex pair. Vertices, transactions,
//! and the graph itself carry typed attributes declared in a registry.

mod attribute;
mod store;

pub use attribute::{AttributeDef, AttributeId, AttributeRegistry};
pub use store::{GraphStore, StoreConfig, TransactionRecord};

/// Which transactions count when walking a vertex's neighbourhood.
///
/// Directed transactions are split into outgoing and incoming; undirected
/// transactions are a third class of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionMode {
    /// Follow directed transactions out of the vertex.
    pub outgoing: bool,
    /// Follow directed transactions into the vertex.
    pub incoming: bool,
    /// Follow undirected transactions.
    pub undirected: bool,
}

impl ConnectionMode {
    /// Follow every transaction regardless of direction.
    pub const ALL: Self = Self {
        outgoing: true,
        incoming: true,
        undirected: true,
    };

    /// Follow only outgoing and undirected transactions.
    pub const OUTGOING: Self = Self {
        outgoing: true,
        incoming: false,
        undirected: true,
    };

    /// Follow only incoming and undirected transactions.
    pub const INCOMING: Self = Self {
        outgoing: false,
        incoming: true,
        undirected: true,
    };

    /// Returns true if no transaction class is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.outgoing && !self.incoming && !self.undirected
    }
}

impl Default for ConnectionMode {
    fn default() -> Self {
        Self::ALL
    }
}
