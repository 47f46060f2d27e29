//! Fast non-cryptographic hashing.
//!
//! Graph ids are small dense integers, so FxHash beats SipHash by a wide
//! margin for the hot adjacency and attribute maps.

pub use rustc_hash::FxHasher;

/// A HashMap using FxHash.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A HashSet using FxHash.
pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;
