//! Editor tokens for transient ownership.

use std::fmt;
use std::sync::Arc;

/// Identity-only ownership token held by a transient map.
///
/// Nodes created by a transient are stamped with its token; a node may be
/// mutated in place only while the stamps match. Tokens compare by
/// pointer identity, never by content, and are never exposed outside the
/// crate.
pub(crate) struct Edit(Arc<()>);

impl Edit {
    pub(crate) fn new() -> Self {
        Self(Arc::new(()))
    }

    /// Returns `true` iff both tokens are the same allocation.
    pub(crate) fn same(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Clone for Edit {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl fmt::Debug for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edit({:p})", Arc::as_ptr(&self.0))
    }
}
