//! The CHAMP map façade: persistent and transient modes.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops;
use std::sync::Arc;

use rustc_hash::FxBuildHasher;

use crate::edit::Edit;
use crate::hash;
use crate::iter::Iter;
use crate::node::{Entry, Node};
use crate::ops::bulk::Combined;
use crate::ops::difference::difference_recursive;
use crate::ops::get::get_recursive;
use crate::ops::insert::insert_recursive;
use crate::ops::intersection::intersection_recursive;
use crate::ops::merge::merge_recursive;
use crate::ops::remove::{RemoveOutcome, remove_recursive};

/// Persistent hash map based on a CHAMP trie.
///
/// Same set of key-value pairs always produces the same trie structure
/// (canonical form), so equal maps share equal shapes and comparison
/// short-circuits over shared subtrees.
///
/// The map starts in persistent mode: updates path-copy `O(log₃₂ N)`
/// nodes and share the rest, so clones are cheap and diverge safely.
/// [`linear`](Self::linear) switches to a transient, single-owner view
/// whose updates mutate owned nodes in place; [`forked`](Self::forked)
/// publishes the result back as a persistent map.
///
/// Hashing is pluggable through the `S: BuildHasher` parameter and
/// defaults to the deterministic `FxBuildHasher`. Key equality is `K`'s
/// `Eq`. Two maps interoperate (equality, set algebra) when built with
/// equal hasher configurations.
pub struct ChampMap<K, V, S = FxBuildHasher> {
    root: Option<Arc<Node<K, V>>>,
    hash_builder: S,
    linear: bool,
    edit: Edit,
}

// ---------------------------------------------------------------------------
// Construction & accessors
// ---------------------------------------------------------------------------

impl<K, V> ChampMap<K, V> {
    /// Creates an empty map with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher::default())
    }
}

impl<K, V, S> ChampMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hash_builder`.
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            root: None,
            hash_builder,
            linear: false,
            edit: Edit::new(),
        }
    }

    /// Returns the number of key-value pairs. `O(1)`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.size())
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns `true` if this is a transient (in-place-mutating) map.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.linear
    }

    /// Returns a lazy iterator over `(&K, &V)` pairs in trie order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref())
    }

    /// Returns an iterator over the keys in trie order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over the values in trie order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[cfg(test)]
    pub(crate) fn root_node(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Read operations — K: Hash + Eq
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, S: BuildHasher> ChampMap<K, V, S> {
    /// Mixes the user hash so the low 5-bit fragments carry entropy.
    fn key_hash(&self, key: &K) -> u32 {
        hash::mix(self.hash_builder.hash_one(key) as u32)
    }

    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_deref()?;
        get_recursive(root, self.key_hash(key), key, 0).map(|e| &e.value)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations — K: Hash + Eq + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K, V, S> ChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Inserts a key-value pair, last write wins.
    ///
    /// Returns `None` if the key was new, or `Some(old_value)` if an
    /// existing value was replaced. Persistent maps path-copy; transient
    /// maps mutate owned nodes in place.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value, None)
    }

    /// Inserts a key-value pair, resolving conflicts with `merge`.
    ///
    /// When the key is already present the stored value becomes
    /// `merge(&old, &new)`; the displaced value is returned.
    pub fn insert_with<F>(&mut self, key: K, value: V, merge: F) -> Option<V>
    where
        F: Fn(&V, &V) -> V,
    {
        self.put(key, value, Some(&merge))
    }

    fn put(&mut self, key: K, value: V, merge: Option<&dyn Fn(&V, &V) -> V>) -> Option<V> {
        let hash = self.key_hash(&key);
        let entry = Entry { hash, key, value };
        let tok = self.linear.then_some(&self.edit);
        if let Some(root) = &mut self.root {
            insert_recursive(root, entry, 0, tok, merge)
        } else {
            self.root = Some(Arc::new(Node::singleton(entry, tok)));
            None
        }
    }

    /// Removes a key from the map. Returns the removed value, or `None`
    /// if the key was not present (in which case nothing is allocated).
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.key_hash(key);
        // Probe first so an absent key never path-copies.
        get_recursive(self.root.as_deref()?, hash, key, 0)?;

        let tok = self.linear.then_some(&self.edit);
        let root = self.root.as_mut().expect("presence probed above");
        match remove_recursive(root, hash, key, 0, tok) {
            RemoveOutcome::NotFound => None,
            RemoveOutcome::Removed { old_value, emptied } => {
                if emptied {
                    self.root = None;
                }
                Some(old_value)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transient lifecycle
// ---------------------------------------------------------------------------

impl<K, V, S: Clone> ChampMap<K, V, S> {
    /// Returns a transient map over the same entries.
    ///
    /// The transient holds a fresh editor token: it takes ownership of
    /// nodes as it copies them and from then on mutates them in place.
    /// A transient is single-owner; it is not safe to share across
    /// threads while being mutated.
    #[must_use]
    pub fn linear(&self) -> Self {
        Self {
            root: self.root.clone(),
            hash_builder: self.hash_builder.clone(),
            linear: true,
            edit: Edit::new(),
        }
    }

    /// Publishes the current entries as a persistent map.
    ///
    /// Burns the receiver's editor token: a transient that keeps being
    /// used after forking falls back to copy-on-write and can never
    /// mutate the published snapshot.
    #[must_use]
    pub fn forked(&mut self) -> Self {
        self.edit = Edit::new();
        Self {
            root: self.root.clone(),
            hash_builder: self.hash_builder.clone(),
            linear: false,
            edit: Edit::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk set algebra — structural, lock-step over both tries
// ---------------------------------------------------------------------------

impl<K, V, S> ChampMap<K, V, S>
where
    K: Eq + Clone,
    V: Clone,
    S: Clone,
{
    /// Returns the union of two maps.
    ///
    /// Keys present in both resolve to `merge(&self_value, &other_value)`.
    /// Subtrees shared between the operands are reused wholesale, so
    /// merging maps that diverged from a common ancestor costs
    /// `O(differing prefix)`.
    ///
    /// Both maps must have been built with equal hasher configurations.
    #[must_use]
    pub fn merge<F>(&self, other: &Self, merge: F) -> Self
    where
        F: Fn(&V, &V) -> V,
    {
        let edit = Edit::new();
        let tok = self.linear.then_some(&edit);
        let root = match (&self.root, &other.root) {
            (Some(a), Some(b)) => Some(if Arc::ptr_eq(a, b) {
                Arc::clone(a)
            } else {
                merge_recursive(a, b, 0, tok, &merge)
            }),
            (Some(a), None) => Some(Arc::clone(a)),
            (None, Some(b)) => Some(Arc::clone(b)),
            (None, None) => None,
        };
        self.derived(root, edit)
    }

    /// Returns the entries of `self` whose keys are also in `other`.
    ///
    /// Values come from `self`. Reference-equal subtrees are kept without
    /// descent.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let edit = Edit::new();
        let tok = self.linear.then_some(&edit);
        let root = match (&self.root, &other.root) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => Some(Arc::clone(a)),
            (Some(a), Some(b)) => combined_root(intersection_recursive(a, b, 0, tok), tok),
            _ => None,
        };
        self.derived(root, edit)
    }

    /// Returns the entries of `self` whose keys are absent from `other`.
    ///
    /// Reference-equal subtrees collapse to empty without descent.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let edit = Edit::new();
        let tok = self.linear.then_some(&edit);
        let root = match (&self.root, &other.root) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => None,
            (Some(a), Some(b)) => combined_root(difference_recursive(a, b, 0, tok), tok),
            (Some(a), None) => Some(Arc::clone(a)),
            (None, _) => None,
        };
        self.derived(root, edit)
    }

    /// Wraps a bulk-operation result in a façade of the receiver's mode.
    fn derived(&self, root: Option<Arc<Node<K, V>>>, edit: Edit) -> Self {
        Self {
            root,
            hash_builder: self.hash_builder.clone(),
            linear: self.linear,
            edit,
        }
    }
}

/// Converts a combination result into a root node.
fn combined_root<K: Clone, V: Clone>(
    combined: Combined<K, V>,
    edit: Option<&Edit>,
) -> Option<Arc<Node<K, V>>> {
    match combined {
        Combined::Empty => None,
        Combined::Single(entry) => Some(Arc::new(Node::singleton(entry, edit))),
        Combined::Node(node) => Some(node),
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, S: Clone> Clone for ChampMap<K, V, S> {
    /// Shares the root in `O(1)`.
    ///
    /// The clone gets a fresh editor token, so a cloned transient cannot
    /// mutate nodes reachable from the original (and vice versa).
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            hash_builder: self.hash_builder.clone(),
            linear: self.linear,
            edit: Edit::new(),
        }
    }
}

impl<K, V, S: Default> Default for ChampMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: Eq, V: PartialEq, S> PartialEq for ChampMap<K, V, S> {
    /// Structural equality with shared-subtree short-circuit.
    ///
    /// Canonical form makes contents-equality and structure-equality
    /// coincide for maps built with equal hasher configurations.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a.subtree_eq(b),
            _ => false,
        }
    }
}

impl<K: Eq, V: Eq, S> Eq for ChampMap<K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChampMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
{
    /// Builds through a transient and forks the result.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default().linear();
        map.extend(iter);
        map.forked()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ops::Index<&K> for ChampMap<K, V, S> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChampMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
