//! Intersection of two tries (keys in both, values from the left).

use std::sync::Arc;

use crate::edit::Edit;
use crate::node::{self, Node};
use crate::ops::bulk::{Combined, NodeBuilder, SlotRef, slot_at};
use crate::ops::get::get_recursive;

/// Intersects the subtrees `a` and `b` at the same depth, keeping the
/// left side's values.
///
/// Reference-equal subtrees are returned unchanged without descent.
pub(crate) fn intersection_recursive<K, V>(
    a: &Arc<Node<K, V>>,
    b: &Arc<Node<K, V>>,
    shift: u32,
    edit: Option<&Edit>,
) -> Combined<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    if Arc::ptr_eq(a, b) {
        return Combined::Node(Arc::clone(a));
    }

    match (&**a, &**b) {
        (Node::Collision { .. }, Node::Collision { .. }) => intersect_collisions(a, b, edit),
        (
            Node::Inner {
                data_map: dm_a,
                node_map: nm_a,
                ..
            },
            Node::Inner {
                data_map: dm_b,
                node_map: nm_b,
                ..
            },
        ) => {
            // Only positions occupied on both sides can contribute.
            let occupied = (dm_a | nm_a) & (dm_b | nm_b);
            let mut builder = NodeBuilder::new();
            for frag in 0..32 {
                let bit = node::mask(frag);
                if occupied & bit == 0 {
                    continue;
                }
                let next = shift + node::BITS_PER_LEVEL;
                match (slot_at(a, bit), slot_at(b, bit)) {
                    (SlotRef::Data(ea), SlotRef::Data(eb)) => {
                        if ea.hash == eb.hash && ea.key == eb.key {
                            builder.push_entry(bit, ea.clone());
                        }
                    }
                    (SlotRef::Data(ea), SlotRef::Child(cb)) => {
                        if get_recursive(cb, ea.hash, &ea.key, next).is_some() {
                            builder.push_entry(bit, ea.clone());
                        }
                    }
                    (SlotRef::Child(ca), SlotRef::Data(eb)) => {
                        if let Some(e) = get_recursive(ca, eb.hash, &eb.key, next) {
                            builder.push_entry(bit, e.clone());
                        }
                    }
                    (SlotRef::Child(ca), SlotRef::Child(cb)) => {
                        if Arc::ptr_eq(ca, cb) {
                            builder.push_child(bit, Arc::clone(ca));
                        } else {
                            builder.push_combined(bit, intersection_recursive(ca, cb, next, edit));
                        }
                    }
                    (SlotRef::Empty, _) | (_, SlotRef::Empty) => {
                        unreachable!("bit occupied on both sides")
                    }
                }
            }
            // Nothing dropped means the whole left subtree survived;
            // hand it back so callers keep sharing it.
            match builder.build(edit) {
                Combined::Node(n) if n.size() == a.size() => Combined::Node(Arc::clone(a)),
                combined => combined,
            }
        }
        _ => unreachable!("collision leaves occur only at maximum depth"),
    }
}

/// Intersection of two collision leaves.
fn intersect_collisions<K, V>(
    a: &Node<K, V>,
    b: &Node<K, V>,
    edit: Option<&Edit>,
) -> Combined<K, V>
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
            entries: eb,
            ..
        },
    ) = (a, b)
    else {
        unreachable!("caller checked both variants")
    };

    let mut entries: Vec<_> = ea
        .iter()
        .filter(|e| eb.iter().any(|other| other.key == e.key))
        .cloned()
        .collect();
    match entries.len() {
        0 => Combined::Empty,
        1 => Combined::Single(entries.pop().expect("one entry")),
        _ => Combined::Node(Arc::new(Node::Collision {
            hash: *ha,
            entries,
            editor: edit.cloned(),
        })),
    }
}
