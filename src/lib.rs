//! Persistent hash map based on CHAMP.
//!
//! CHAMP (Compressed Hash-Array Mapped Prefix-tree) is a refined HAMT that
//! guarantees **canonical form**: the same set of key-value pairs always
//! produces the same trie structure, regardless of operation history.
//!
//! # Key properties
//!
//! - **Canonical form**: same contents = same structure
//! - **Structural sharing**: an update on a map of size `N` allocates
//!   `O(log₃₂ N)` fresh nodes and shares the rest
//! - **Transients**: single-owner maps that mutate owned nodes in place
//! - **Structural set algebra**: union, intersection and difference walk
//!   two tries in lock-step and reuse shared subtrees wholesale
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Persistent and transient modes
//!
//! A [`ChampMap`] starts persistent: updates path-copy, and any clone of
//! the map keeps observing its own version. [`ChampMap::linear`] returns a
//! transient view that mutates nodes it owns in place; once built,
//! [`ChampMap::forked`] publishes it back as a persistent map.
//!
//! ```
//! use champ_map::ChampMap;
//!
//! let mut m = ChampMap::new().linear();
//! for i in 0..100 {
//!     m.insert(i, i * 2);
//! }
//! let published = m.forked();
//! assert_eq!(published.get(&7), Some(&14));
//! ```
//!
//! # References
//!
//! - Steindorfer & Vinju, 2015 — "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015
//! - Bagwell, 2001 — "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod iter;

mod edit;
mod hash;
mod map;
mod node;
mod ops;

#[cfg(test)]
mod tests;

pub use map::ChampMap;
