//! Union of two tries with value merging.

use std::sync::Arc;

use crate::edit::Edit;
use crate::node::{self, Entry, Node};
use crate::ops::bulk::{Combined, NodeBuilder, SlotRef, slot_at};
use crate::ops::insert::{create_subtree, insert_recursive};

/// Merges the subtrees `a` and `b` at the same depth.
///
/// Keys present on both sides resolve to `merge(a_value, b_value)`.
/// Reference-equal subtrees are reused without descent, so merging a map
/// with a near-identical sibling touches only the differing prefix.
pub(crate) fn merge_recursive<K, V>(
    a: &Arc<Node<K, V>>,
    b: &Arc<Node<K, V>>,
    shift: u32,
    edit: Option<&Edit>,
    merge: &dyn Fn(&V, &V) -> V,
) -> Arc<Node<K, V>>
where
    K: Eq + Clone,
    V: Clone,
{
    if Arc::ptr_eq(a, b) {
        return Arc::clone(a);
    }

    match (&**a, &**b) {
        (Node::Collision { .. }, Node::Collision { .. }) => {
            Arc::new(merge_collisions(a, b, edit, merge))
        }
        (Node::Inner { .. }, Node::Inner { .. }) => {
            let mut builder = NodeBuilder::new();
            for frag in 0..32 {
                let bit = node::mask(frag);
                match (slot_at(a, bit), slot_at(b, bit)) {
                    (SlotRef::Empty, SlotRef::Empty) => {}
                    (SlotRef::Data(e), SlotRef::Empty) | (SlotRef::Empty, SlotRef::Data(e)) => {
                        builder.push_entry(bit, e.clone());
                    }
                    (SlotRef::Child(c), SlotRef::Empty) | (SlotRef::Empty, SlotRef::Child(c)) => {
                        builder.push_child(bit, Arc::clone(c));
                    }
                    (SlotRef::Data(ea), SlotRef::Data(eb)) => {
                        if ea.hash == eb.hash && ea.key == eb.key {
                            builder.push_entry(
                                bit,
                                Entry {
                                    hash: ea.hash,
                                    key: ea.key.clone(),
                                    value: merge(&ea.value, &eb.value),
                                },
                            );
                        } else {
                            let sub = create_subtree(
                                ea.clone(),
                                eb.clone(),
                                shift + node::BITS_PER_LEVEL,
                                edit,
                            );
                            builder.push_child(bit, Arc::new(sub));
                        }
                    }
                    (SlotRef::Data(ea), SlotRef::Child(cb)) => {
                        // The left entry joins the right subtree; flip the
                        // merge so arguments stay (left value, right value).
                        let flipped = |old: &V, new: &V| merge(new, old);
                        let mut child = Arc::clone(cb);
                        insert_recursive(
                            &mut child,
                            ea.clone(),
                            shift + node::BITS_PER_LEVEL,
                            edit,
                            Some(&flipped),
                        );
                        builder.push_child(bit, child);
                    }
                    (SlotRef::Child(ca), SlotRef::Data(eb)) => {
                        let mut child = Arc::clone(ca);
                        insert_recursive(
                            &mut child,
                            eb.clone(),
                            shift + node::BITS_PER_LEVEL,
                            edit,
                            Some(merge),
                        );
                        builder.push_child(bit, child);
                    }
                    (SlotRef::Child(ca), SlotRef::Child(cb)) => {
                        let child = if Arc::ptr_eq(ca, cb) {
                            Arc::clone(ca)
                        } else {
                            merge_recursive(ca, cb, shift + node::BITS_PER_LEVEL, edit, merge)
                        };
                        builder.push_child(bit, child);
                    }
                }
            }
            match builder.build(edit) {
                Combined::Node(n) => n,
                // Two single-entry roots with the same key can fuse.
                Combined::Single(e) => {
                    debug_assert_eq!(shift, 0, "non-root nodes hold at least two entries");
                    Arc::new(Node::singleton(e, edit))
                }
                Combined::Empty => unreachable!("union of non-empty subtrees is non-empty"),
            }
        }
        _ => unreachable!("collision leaves occur only at maximum depth"),
    }
}

/// Union of two collision leaves sharing the same full hash.
fn merge_collisions<K, V>(
    a: &Node<K, V>,
    b: &Node<K, V>,
    edit: Option<&Edit>,
    merge: &dyn Fn(&V, &V) -> V,
) -> Node<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    let (
        Node::Collision {
            hash: ha,
            entries: ea,
            ..
        },
        Node::Collision {
            hash: hb,
            entries: eb,
            ..
        },
    ) = (a, b)
    else {
        unreachable!("caller checked both variants")
    };
    debug_assert_eq!(ha, hb, "colliding leaves at the same position share a hash");

    let mut entries = ea.clone();
    for be in eb {
        match entries.iter_mut().find(|e| e.key == be.key) {
            Some(e) => {
                let merged = merge(&e.value, &be.value);
                e.value = merged;
            }
            None => entries.push(be.clone()),
        }
    }
    Node::Collision {
        hash: *ha,
        entries,
        editor: edit.cloned(),
    }
}
