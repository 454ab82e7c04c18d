//! Recursive CHAMP trie operations.

use std::sync::Arc;

use crate::edit::Edit;
use crate::node::Node;

pub(crate) mod bulk;
pub(crate) mod difference;
pub(crate) mod get;
pub(crate) mod insert;
pub(crate) mod intersection;
pub(crate) mod merge;
pub(crate) mod remove;

/// Prepares a node for mutation, honoring the editor discipline.
///
/// The node is mutated in place only when it is stamped with the caller's
/// token *and* its `Arc` is uniquely referenced; otherwise it is replaced
/// by a shallow copy stamped with the caller's token. Persistent callers
/// pass `None` and always get the copy.
pub(crate) fn make_mut<'a, K: Clone, V: Clone>(
    node: &'a mut Arc<Node<K, V>>,
    edit: Option<&Edit>,
) -> &'a mut Node<K, V> {
    let owned = edit.is_some_and(|e| node.is_owned_by(e)) && Arc::get_mut(node).is_some();
    if !owned {
        *node = Arc::new(node.clone_for(edit));
    }
    Arc::get_mut(node).expect("freshly copied node is uniquely referenced")
}
