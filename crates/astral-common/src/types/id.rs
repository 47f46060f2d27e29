//! Identifier types for graph elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a vertex in the graph.
///
/// Internally represented as a `u64`. VertexIds are assigned sequentially
/// and are never reused within a graph.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[repr(transparent)]
pub struct VertexId(pub u64);

impl VertexId {
    /// The invalid/null vertex ID.
    pub const INVALID: Self = Self(u64::MAX);

    /// Creates a new VertexId from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid vertex ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "VertexId({})", self.0)
        } else {
            write!(f, "VertexId(INVALID)")
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<VertexId> for u64 {
    fn from(id: VertexId) -> Self {
        id.0
    }
}

/// Unique identifier for a transaction in the graph.
///
/// A transaction is one edge instance between two vertices; several
/// transactions may connect the same pair.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[repr(transparent)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// The invalid/null transaction ID.
    pub const INVALID: Self = Self(u64::MAX);

    /// Creates a new TransactionId from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid transaction ID.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TransactionId({})", self.0)
        } else {
            write!(f, "TransactionId(INVALID)")
        }
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TransactionId> for u64 {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

/// Identifier for a graph instance, used to key execution reports.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[repr(transparent)]
pub struct GraphId(pub u64);

impl GraphId {
    /// Creates a new GraphId from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphId({})", self.0)
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validity() {
        assert!(VertexId::new(0).is_valid());
        assert!(!VertexId::INVALID.is_valid());
        assert!(TransactionId::new(42).is_valid());
        assert!(!TransactionId::INVALID.is_valid());
    }

    #[test]
    fn test_id_ordering() {
        assert!(VertexId::new(1) < VertexId::new(2));
        assert!(TransactionId::new(0) < TransactionId::INVALID);
    }

    #[test]
    fn test_id_conversions() {
        let v: VertexId = 7u64.into();
        assert_eq!(u64::from(v), 7);
        let t: TransactionId = 9u64.into();
        assert_eq!(t.as_u64(), 9);
    }
}
