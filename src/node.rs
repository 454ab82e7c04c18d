//! CHAMP trie node types and bitmap helpers.

use std::fmt;
use std::sync::Arc;

use crate::edit::Edit;

/// Bits per trie level (5 → 32-way branching).
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift value (depth 6, last level uses 2 bits).
///
/// A node addressed past this shift has exhausted the 32-bit hash and is
/// always a collision leaf.
pub(crate) const MAX_SHIFT: u32 = 30;

/// Inline entry storing a key-value pair with its precomputed mixed hash.
///
/// Caching the hash keeps every node-level operation free of `K: Hash`
/// bounds and re-hashing.
#[derive(Clone)]
pub(crate) struct Entry<K, V> {
    /// Precomputed 32-bit mixed hash of the key.
    pub hash: u32,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

/// CHAMP trie node.
///
/// Two variants maintain the canonical form invariant:
/// - [`Inner`](Self::Inner) — bitmap-compressed node at shift ≤ [`MAX_SHIFT`]
/// - [`Collision`](Self::Collision) — linear node for full 32-bit hash collisions
pub(crate) enum Node<K, V> {
    /// Bitmap-compressed inner node.
    ///
    /// Invariants: `data_map & node_map == 0`,
    /// `entries.len() == popcount(data_map)`,
    /// `children.len() == popcount(node_map)`.
    Inner {
        /// Bitmap of positions occupied by inline entries.
        data_map: u32,
        /// Bitmap of positions occupied by child subtrees.
        node_map: u32,
        /// Inline entries, ordered by ascending bit rank in `data_map`.
        entries: Vec<Entry<K, V>>,
        /// Child subtrees, ordered by descending bit rank in `node_map`
        /// (tail-packed: see [`child_index`]).
        children: Vec<Arc<Node<K, V>>>,
        /// Total number of entries in this subtree, cached.
        size: usize,
        /// Token of the transient that owns this node, if any.
        editor: Option<Edit>,
    },
    /// Collision node for keys sharing the same 32-bit mixed hash.
    ///
    /// Invariant: `entries.len() >= 2` and all keys pairwise non-equal.
    Collision {
        /// The shared 32-bit mixed hash value.
        hash: u32,
        /// Colliding entries, in arrival order.
        entries: Vec<Entry<K, V>>,
        /// Token of the transient that owns this node, if any.
        editor: Option<Edit>,
    },
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
#[must_use]
pub(crate) const fn fragment(hash: u32, shift: u32) -> u32 {
    (hash >> shift) & 0x1F
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub(crate) const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact rank of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub(crate) const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

/// Maps a bit's rank to its position in the tail-packed `children` array.
///
/// Children are stored from the high end: the lowest-ranked bit lives at
/// the last index, so entries and children can grow towards each other in
/// the packed layout.
#[inline]
#[must_use]
pub(crate) const fn child_index(node_map: u32, bit: u32, len: usize) -> usize {
    len - 1 - index(node_map, bit)
}

// ---------------------------------------------------------------------------
// Node accessors
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Returns the total number of entries in this subtree. `O(1)`.
    #[must_use]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Inner { size, .. } => *size,
            Self::Collision { entries, .. } => entries.len(),
        }
    }

    /// Returns `true` if this node is owned by the given editor token.
    #[must_use]
    pub(crate) fn is_owned_by(&self, edit: &Edit) -> bool {
        match self {
            Self::Inner { editor, .. } | Self::Collision { editor, .. } => {
                editor.as_ref().is_some_and(|e| Edit::same(e, edit))
            }
        }
    }

    /// Returns the sole inline entry of an inner node that holds exactly
    /// one entry and no children — the shape the parent must contract.
    ///
    /// Collision nodes are never contracted into their parent.
    #[must_use]
    pub(crate) fn single_entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Self::Inner {
                data_map,
                node_map: 0,
                entries,
                ..
            } if data_map.is_power_of_two() => entries.first(),
            _ => None,
        }
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Creates an inner node holding a single entry.
    ///
    /// Only ever observed at the root, or transiently while a parent
    /// inlines it during contraction.
    #[must_use]
    pub(crate) fn singleton(entry: Entry<K, V>, edit: Option<&Edit>) -> Self {
        Self::Inner {
            data_map: mask(fragment(entry.hash, 0)),
            node_map: 0,
            entries: vec![entry],
            children: Vec::new(),
            size: 1,
            editor: edit.cloned(),
        }
    }

    /// Shallow copy for copy-on-write, stamped with the caller's token.
    ///
    /// Entries are cloned; children are shared via `Arc`.
    #[must_use]
    pub(crate) fn clone_for(&self, edit: Option<&Edit>) -> Self {
        match self {
            Self::Inner {
                data_map,
                node_map,
                entries,
                children,
                size,
                ..
            } => Self::Inner {
                data_map: *data_map,
                node_map: *node_map,
                entries: entries.clone(),
                children: children.clone(),
                size: *size,
                editor: edit.cloned(),
            },
            Self::Collision { hash, entries, .. } => Self::Collision {
                hash: *hash,
                entries: entries.clone(),
                editor: edit.cloned(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Subtree equality
// ---------------------------------------------------------------------------

impl<K: Eq, V: PartialEq> Node<K, V> {
    /// Structural equality of two subtrees.
    ///
    /// Shared subtrees short-circuit by pointer identity, so comparing two
    /// maps that diverged from a common version costs `O(differing prefix)`
    /// rather than `O(N)`.
    pub(crate) fn subtree_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Inner {
                    data_map: dm_a,
                    node_map: nm_a,
                    entries: ea,
                    children: ca,
                    size: sa,
                    ..
                },
                Self::Inner {
                    data_map: dm_b,
                    node_map: nm_b,
                    entries: eb,
                    children: cb,
                    size: sb,
                    ..
                },
            ) => {
                dm_a == dm_b
                    && nm_a == nm_b
                    && sa == sb
                    && ea
                        .iter()
                        .zip(eb)
                        .all(|(x, y)| x.hash == y.hash && x.key == y.key && x.value == y.value)
                    && ca
                        .iter()
                        .zip(cb)
                        .all(|(x, y)| Arc::ptr_eq(x, y) || x.subtree_eq(y))
            }
            (
                Self::Collision {
                    hash: ha,
                    entries: ea,
                    ..
                },
                Self::Collision {
                    hash: hb,
                    entries: eb,
                    ..
                },
            ) => {
                // Collision entries are in arrival order, which is not
                // canonical; compare as a set. Keys are pairwise distinct,
                // so a quadratic scan is exact.
                ha == hb
                    && ea.len() == eb.len()
                    && ea
                        .iter()
                        .all(|x| eb.iter().any(|y| x.key == y.key && x.value == y.value))
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Debug
// ---------------------------------------------------------------------------

impl<K, V> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner {
                data_map,
                node_map,
                size,
                ..
            } => f
                .debug_struct("Inner")
                .field("data_map", &format_args!("{data_map:#034b}"))
                .field("node_map", &format_args!("{node_map:#034b}"))
                .field("size", size)
                .finish(),
            Self::Collision { hash, entries, .. } => f
                .debug_struct("Collision")
                .field("hash", hash)
                .field("entries_len", &entries.len())
                .finish(),
        }
    }
}
