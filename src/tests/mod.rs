//! Unit tests, one module per concern, plus shared test fixtures.

use std::hash::{BuildHasherDefault, Hasher};

use crate::ChampMap;
use crate::node::{self, Node};

mod basic;
mod completeness;
mod traits;

// ---------------------------------------------------------------------------
// Invariant walker
// ---------------------------------------------------------------------------

/// Asserts every structural invariant of the trie: bitmap disjointness,
/// bitmap/array agreement, cached sizes, fragment addressing, collision
/// depth, and the canonical contraction invariant.
pub(crate) fn check_invariants<K: Eq, V, S>(map: &ChampMap<K, V, S>) {
    match map.root_node() {
        Some(root) => {
            assert_eq!(map.len(), root.size());
            check_node(root, 0, 0, true);
        }
        None => assert_eq!(map.len(), 0),
    }
}

fn low_mask(shift: u32) -> u32 {
    if shift >= 32 {
        u32::MAX
    } else {
        (1_u32 << shift) - 1
    }
}

fn check_node<K: Eq, V>(n: &Node<K, V>, shift: u32, prefix: u32, is_root: bool) {
    match n {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            size,
            ..
        } => {
            assert!(shift <= node::MAX_SHIFT, "inner node below maximum depth");
            assert_eq!(data_map & node_map, 0, "bitmaps overlap");
            assert_eq!(entries.len(), data_map.count_ones() as usize);
            assert_eq!(children.len(), node_map.count_ones() as usize);

            let computed = entries.len() + children.iter().map(|c| c.size()).sum::<usize>();
            assert_eq!(*size, computed, "cached size disagrees with subtree");
            if !is_root {
                assert!(*size >= 2, "non-root node holds fewer than two entries");
            }

            let frags = (0..32).filter(|f| data_map & node::mask(*f) != 0);
            for (frag, e) in frags.zip(entries) {
                assert_eq!(node::fragment(e.hash, shift), frag, "entry at wrong slot");
                assert_eq!(e.hash & low_mask(shift), prefix, "entry strayed off its path");
            }

            for frag in 0..32 {
                let bit = node::mask(frag);
                if node_map & bit != 0 {
                    let child = &children[node::child_index(*node_map, bit, children.len())];
                    check_node(
                        child,
                        shift + node::BITS_PER_LEVEL,
                        prefix | (frag << shift),
                        false,
                    );
                }
            }
        }
        Node::Collision { hash, entries, .. } => {
            assert!(shift > node::MAX_SHIFT, "collision leaf above maximum depth");
            assert!(entries.len() >= 2, "collision leaf holds fewer than two entries");
            assert_eq!(*hash, prefix, "collision hash disagrees with its path");
            for (i, e) in entries.iter().enumerate() {
                assert_eq!(e.hash, *hash);
                assert!(
                    entries[..i].iter().all(|other| other.key != e.key),
                    "duplicate key in collision leaf"
                );
            }
        }
    }
}

/// Root bitmaps, for canonical-structure assertions.
pub(crate) fn root_bitmaps<K, V, S>(map: &ChampMap<K, V, S>) -> Option<(u32, u32)> {
    map.root_node().map(|n| match n {
        Node::Inner {
            data_map, node_map, ..
        } => (*data_map, *node_map),
        Node::Collision { .. } => unreachable!("root is always an inner node"),
    })
}

// ---------------------------------------------------------------------------
// Degenerate hashers
// ---------------------------------------------------------------------------

/// Keeps only the low byte of the written value: `h(k) = k & 0xFF`.
#[derive(Clone, Default)]
pub(crate) struct MaskedHasher {
    acc: u64,
    shift: u32,
}

impl Hasher for MaskedHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.shift < 64 {
                self.acc |= u64::from(b) << self.shift;
                self.shift += 8;
            }
        }
    }

    fn finish(&self) -> u64 {
        self.acc & 0xFF
    }
}

pub(crate) type MaskedBuild = BuildHasherDefault<MaskedHasher>;

/// Hashes everything to zero, forcing every key into one collision leaf.
#[derive(Clone, Default)]
pub(crate) struct ZeroHasher;

impl Hasher for ZeroHasher {
    fn write(&mut self, _bytes: &[u8]) {}

    fn finish(&self) -> u64 {
        0
    }
}

pub(crate) type ZeroBuild = BuildHasherDefault<ZeroHasher>;
