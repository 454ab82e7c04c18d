//! Difference of two tries (keys of the left absent from the right).

use std::sync::Arc;

use crate::edit::Edit;
use crate::node::{self, Node};
use crate::ops::bulk::{Combined, NodeBuilder, SlotRef, slot_at};
use crate::ops::get::get_recursive;
use crate::ops::remove::{RemoveOutcome, remove_recursive};

/// Subtracts the subtree `b` from `a` at the same depth.
///
/// Reference-equal subtrees collapse to empty without descent; the
/// contraction invariant is restored while the result is assembled.
pub(crate) fn difference_recursive<K, V>(
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
        return Combined::Empty;
    }

    match (&**a, &**b) {
        (Node::Collision { .. }, Node::Collision { .. }) => difference_collisions(a, b, edit),
        (
            Node::Inner {
                data_map: dm_a,
                node_map: nm_a,
                ..
            },
            Node::Inner { .. },
        ) => {
            let occupied = dm_a | nm_a;
            let mut builder = NodeBuilder::new();
            for frag in 0..32 {
                let bit = node::mask(frag);
                if occupied & bit == 0 {
                    continue;
                }
                let next = shift + node::BITS_PER_LEVEL;
                match (slot_at(a, bit), slot_at(b, bit)) {
                    (SlotRef::Data(ea), SlotRef::Empty) => builder.push_entry(bit, ea.clone()),
                    (SlotRef::Data(ea), SlotRef::Data(eb)) => {
                        if !(ea.hash == eb.hash && ea.key == eb.key) {
                            builder.push_entry(bit, ea.clone());
                        }
                    }
                    (SlotRef::Data(ea), SlotRef::Child(cb)) => {
                        if get_recursive(cb, ea.hash, &ea.key, next).is_none() {
                            builder.push_entry(bit, ea.clone());
                        }
                    }
                    (SlotRef::Child(ca), SlotRef::Empty) => {
                        builder.push_child(bit, Arc::clone(ca));
                    }
                    (SlotRef::Child(ca), SlotRef::Data(eb)) => {
                        // Subtracting a single key: plain removal, then
                        // the usual contraction checks.
                        let mut child = Arc::clone(ca);
                        match remove_recursive(&mut child, eb.hash, &eb.key, next, edit) {
                            RemoveOutcome::NotFound => builder.push_child(bit, child),
                            RemoveOutcome::Removed { emptied: true, .. } => {}
                            RemoveOutcome::Removed { emptied: false, .. } => {
                                let single = child.single_entry().cloned();
                                match single {
                                    Some(e) => builder.push_entry(bit, e),
                                    None => builder.push_child(bit, child),
                                }
                            }
                        }
                    }
                    (SlotRef::Child(ca), SlotRef::Child(cb)) => {
                        if !Arc::ptr_eq(ca, cb) {
                            builder.push_combined(bit, difference_recursive(ca, cb, next, edit));
                        }
                    }
                    (SlotRef::Empty, _) => unreachable!("bit occupied on the left side"),
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

/// Difference of two collision leaves.
fn difference_collisions<K, V>(
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
        Node::Collision { entries: eb, .. },
    ) = (a, b)
    else {
        unreachable!("caller checked both variants")
    };

    let mut entries: Vec<_> = ea
        .iter()
        .filter(|e| !eb.iter().any(|other| other.key == e.key))
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
