//! Lookup operation.

use crate::node::{self, Entry, Node};

/// Finds the entry for `key` in the subtree rooted at `node`.
///
/// Descends by 5-bit hash fragments; collision leaves are scanned
/// linearly.
pub(crate) fn get_recursive<'a, K: Eq, V>(
    node: &'a Node<K, V>,
    hash: u32,
    key: &K,
    shift: u32,
) -> Option<&'a Entry<K, V>> {
    match node {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } => {
            let frag = node::fragment(hash, shift);
            let bit = node::mask(frag);

            if data_map & bit != 0 {
                let e = &entries[node::index(*data_map, bit)];
                (e.hash == hash && e.key == *key).then_some(e)
            } else if node_map & bit != 0 {
                let child = &children[node::child_index(*node_map, bit, children.len())];
                get_recursive(child, hash, key, shift + node::BITS_PER_LEVEL)
            } else {
                None
            }
        }
        Node::Collision {
            hash: node_hash,
            entries,
            ..
        } => {
            if *node_hash != hash {
                return None;
            }
            entries.iter().find(|e| e.key == *key)
        }
    }
}
