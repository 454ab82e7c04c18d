//! Removal operation — path-copy delete with canonical contraction.

use std::sync::Arc;

use crate::edit::Edit;
use crate::node::{self, Entry, Node};
use crate::ops::make_mut;

/// Outcome of a recursive remove.
pub(crate) enum RemoveOutcome<V> {
    /// Key was not found — tree unchanged.
    NotFound,
    /// Key was removed and `node` was updated.
    Removed {
        /// The removed value.
        old_value: V,
        /// `true` when the subtree is now empty and the caller must drop
        /// the slot (or clear the root).
        emptied: bool,
    },
}

/// Removes `key` from the subtree rooted at `node`.
///
/// Restores the canonical contraction invariant on the way back up: an
/// emptied child is unlinked, and a child left holding a single entry is
/// inlined into this node.
pub(crate) fn remove_recursive<K, V>(
    node: &mut Arc<Node<K, V>>,
    hash: u32,
    key: &K,
    shift: u32,
    edit: Option<&Edit>,
) -> RemoveOutcome<V>
where
    K: Eq + Clone,
    V: Clone,
{
    if matches!(&**node, Node::Collision { .. }) {
        return remove_from_collision(node, hash, key, edit);
    }

    let frag = node::fragment(hash, shift);
    let bit = node::mask(frag);

    enum Place {
        Data(usize),
        Child(usize),
        Missing,
    }

    let place = {
        let Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } = &**node
        else {
            unreachable!("collision case handled above")
        };
        if data_map & bit != 0 {
            let pos = node::index(*data_map, bit);
            let e = &entries[pos];
            if e.hash == hash && e.key == *key {
                Place::Data(pos)
            } else {
                Place::Missing
            }
        } else if node_map & bit != 0 {
            Place::Child(node::child_index(*node_map, bit, children.len()))
        } else {
            Place::Missing
        }
    };

    match place {
        Place::Missing => RemoveOutcome::NotFound,
        Place::Data(pos) => {
            let Node::Inner {
                data_map,
                entries,
                size,
                ..
            } = make_mut(node, edit)
            else {
                unreachable!()
            };
            let e = entries.remove(pos);
            *data_map &= !bit;
            *size -= 1;
            RemoveOutcome::Removed {
                old_value: e.value,
                emptied: *size == 0,
            }
        }
        Place::Child(at) => {
            let Node::Inner {
                data_map,
                node_map,
                entries,
                children,
                size,
                ..
            } = make_mut(node, edit)
            else {
                unreachable!()
            };
            match remove_recursive(&mut children[at], hash, key, shift + node::BITS_PER_LEVEL, edit)
            {
                RemoveOutcome::NotFound => RemoveOutcome::NotFound,
                RemoveOutcome::Removed { old_value, emptied } => {
                    *size -= 1;
                    if emptied {
                        children.remove(at);
                        *node_map &= !bit;
                    } else if children[at].single_entry().is_some() {
                        // Canonical contraction: pull the child's lone
                        // entry back inline.
                        let entry = take_single_entry(children.remove(at));
                        *node_map &= !bit;
                        *data_map |= bit;
                        entries.insert(node::index(*data_map, bit), entry);
                    }
                    RemoveOutcome::Removed {
                        old_value,
                        emptied: *size == 0,
                    }
                }
            }
        }
    }
}

/// Extracts the lone entry from a single-entry inner node, by move when
/// the node is uniquely referenced.
fn take_single_entry<K: Clone, V: Clone>(child: Arc<Node<K, V>>) -> Entry<K, V> {
    match Arc::try_unwrap(child) {
        Ok(Node::Inner { mut entries, .. }) => entries.pop().expect("single entry"),
        Ok(Node::Collision { .. }) => unreachable!("collision nodes are never contracted"),
        Err(shared) => shared
            .single_entry()
            .expect("caller checked the shape")
            .clone(),
    }
}

// ---------------------------------------------------------------------------
// Collision node remove
// ---------------------------------------------------------------------------

fn remove_from_collision<K, V>(
    node: &mut Arc<Node<K, V>>,
    hash: u32,
    key: &K,
    edit: Option<&Edit>,
) -> RemoveOutcome<V>
where
    K: Eq + Clone,
    V: Clone,
{
    let pos = {
        let Node::Collision {
            hash: node_hash,
            entries,
            ..
        } = &**node
        else {
            unreachable!("caller checked the variant")
        };
        if *node_hash != hash {
            return RemoveOutcome::NotFound;
        }
        match entries.iter().position(|e| e.key == *key) {
            Some(pos) => pos,
            None => return RemoveOutcome::NotFound,
        }
    };

    let n = make_mut(node, edit);
    let Node::Collision { entries, .. } = &mut *n else {
        unreachable!()
    };

    if entries.len() == 2 {
        // Two entries minus one breaks the collision invariant; rehome
        // the survivor as a single-entry inner node, which the parent
        // inlines on the way up.
        let removed = entries.remove(pos);
        let remaining = entries.pop().expect("two entries");
        *n = Node::singleton(remaining, edit);
        return RemoveOutcome::Removed {
            old_value: removed.value,
            emptied: false,
        };
    }

    let e = entries.remove(pos);
    RemoveOutcome::Removed {
        old_value: e.value,
        emptied: false,
    }
}
