//! Insertion operation — path-copy insert with editor-gated in-place
//! mutation.

use std::mem;
use std::sync::Arc;

use crate::edit::Edit;
use crate::node::{self, Entry, Node};
use crate::ops::make_mut;

/// Inserts `entry` into the subtree rooted at `node`.
///
/// Returns the displaced value when the key was already present. On a
/// key match the merge function is applied as `merge(old, new)`; without
/// one the incoming value replaces the old.
///
/// Nodes owned by `edit` are mutated in place; everything else is
/// path-copied and the copies are stamped with `edit`.
pub(crate) fn insert_recursive<K, V>(
    node: &mut Arc<Node<K, V>>,
    entry: Entry<K, V>,
    shift: u32,
    edit: Option<&Edit>,
    merge: Option<&dyn Fn(&V, &V) -> V>,
) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
{
    if matches!(&**node, Node::Collision { .. }) {
        return insert_into_collision(node, entry, edit, merge);
    }

    let frag = node::fragment(entry.hash, shift);
    let bit = node::mask(frag);

    enum Place {
        DataFound(usize),
        DataSplit(usize),
        Child(usize),
        Empty,
    }

    // Probe the current node before committing to any allocation.
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
            if e.hash == entry.hash && e.key == entry.key {
                Place::DataFound(pos)
            } else {
                Place::DataSplit(pos)
            }
        } else if node_map & bit != 0 {
            Place::Child(node::child_index(*node_map, bit, children.len()))
        } else {
            Place::Empty
        }
    };

    match place {
        Place::DataFound(pos) => {
            // Run the merge callback against the still-shared node, so a
            // panicking callback leaves the map untouched.
            let merged = merge.map(|f| {
                let Node::Inner { entries, .. } = &**node else {
                    unreachable!()
                };
                f(&entries[pos].value, &entry.value)
            });
            let Node::Inner { entries, .. } = make_mut(node, edit) else {
                unreachable!()
            };
            let new_value = merged.unwrap_or(entry.value);
            Some(mem::replace(&mut entries[pos].value, new_value))
        }
        Place::DataSplit(pos) => {
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
            let existing = entries.remove(pos);
            let subtree = create_subtree(existing, entry, shift + node::BITS_PER_LEVEL, edit);
            *data_map &= !bit;
            *node_map |= bit;
            let rank = node::index(*node_map, bit);
            children.insert(children.len() - rank, Arc::new(subtree));
            *size += 1;
            None
        }
        Place::Child(at) => {
            let Node::Inner { children, size, .. } = make_mut(node, edit) else {
                unreachable!()
            };
            let old = insert_recursive(
                &mut children[at],
                entry,
                shift + node::BITS_PER_LEVEL,
                edit,
                merge,
            );
            if old.is_none() {
                *size += 1;
            }
            old
        }
        Place::Empty => {
            let Node::Inner {
                data_map,
                entries,
                size,
                ..
            } = make_mut(node, edit)
            else {
                unreachable!()
            };
            *data_map |= bit;
            entries.insert(node::index(*data_map, bit), entry);
            *size += 1;
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Collision node insert
// ---------------------------------------------------------------------------

fn insert_into_collision<K, V>(
    node: &mut Arc<Node<K, V>>,
    entry: Entry<K, V>,
    edit: Option<&Edit>,
    merge: Option<&dyn Fn(&V, &V) -> V>,
) -> Option<V>
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
        debug_assert_eq!(*node_hash, entry.hash, "collision node hash mismatch");
        entries.iter().position(|e| e.key == entry.key)
    };

    match pos {
        Some(pos) => {
            let merged = merge.map(|f| {
                let Node::Collision { entries, .. } = &**node else {
                    unreachable!()
                };
                f(&entries[pos].value, &entry.value)
            });
            let Node::Collision { entries, .. } = make_mut(node, edit) else {
                unreachable!()
            };
            let new_value = merged.unwrap_or(entry.value);
            Some(mem::replace(&mut entries[pos].value, new_value))
        }
        None => {
            let Node::Collision { entries, .. } = make_mut(node, edit) else {
                unreachable!()
            };
            entries.push(entry);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Subtree creation
// ---------------------------------------------------------------------------

/// Creates a subtree from two entries that collide at the current depth.
///
/// Recursively descends until hash fragments differ, or creates a
/// collision node past [`MAX_SHIFT`](node::MAX_SHIFT).
pub(crate) fn create_subtree<K, V>(
    e1: Entry<K, V>,
    e2: Entry<K, V>,
    shift: u32,
    edit: Option<&Edit>,
) -> Node<K, V> {
    if shift > node::MAX_SHIFT {
        debug_assert_eq!(e1.hash, e2.hash);
        return Node::Collision {
            hash: e1.hash,
            entries: vec![e1, e2],
            editor: edit.cloned(),
        };
    }

    let f1 = node::fragment(e1.hash, shift);
    let f2 = node::fragment(e2.hash, shift);

    if f1 == f2 {
        let child = create_subtree(e1, e2, shift + node::BITS_PER_LEVEL, edit);
        let size = child.size();
        Node::Inner {
            data_map: 0,
            node_map: node::mask(f1),
            entries: Vec::new(),
            children: vec![Arc::new(child)],
            size,
            editor: edit.cloned(),
        }
    } else {
        let entries = if f1 < f2 { vec![e1, e2] } else { vec![e2, e1] };
        Node::Inner {
            data_map: node::mask(f1) | node::mask(f2),
            node_map: 0,
            entries,
            children: Vec::new(),
            size: 2,
            editor: edit.cloned(),
        }
    }
}
