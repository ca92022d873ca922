//! Fixed-capacity node arena.
//!
//! The pool wraps caller-owned storage and threads every free node into a
//! singly linked freelist through the `sibling` link. Allocation pops the
//! head in O(1). Nodes are never freed one at a time: [`Pool::reset`] returns
//! the whole storage to the freelist at once.

use bstr::BStr;

use crate::{
    error::PoolError,
    node::{EmitState, Kind, Node, NodeId, Value},
    options::EmitOptions,
};

/// A JSON node arena over caller-supplied storage.
///
/// `'a` is the lifetime of the strings the nodes borrow, `'p` the borrow of
/// the storage itself.
///
/// # Examples
///
/// ```rust
/// use jsonpool::{Kind, Node, Pool, PoolError};
///
/// let mut storage = [Node::EMPTY; 2];
/// let mut pool = Pool::new(&mut storage);
/// assert_eq!(pool.available(), 2);
///
/// pool.allocate(Kind::Null).unwrap();
/// pool.allocate(Kind::Null).unwrap();
/// assert_eq!(pool.allocate(Kind::Null), Err(PoolError::Exhausted));
///
/// pool.reset();
/// assert_eq!(pool.available(), 2);
/// ```
#[derive(Debug)]
pub struct Pool<'a, 'p> {
    nodes: &'p mut [Node<'a>],
    free: Option<NodeId>,
    options: EmitOptions,
}

impl<'a, 'p> Pool<'a, 'p> {
    /// Wrap `storage` with default [`EmitOptions`] and reset it.
    #[must_use]
    pub fn new(storage: &'p mut [Node<'a>]) -> Self {
        Self::with_options(storage, EmitOptions::default())
    }

    /// Wrap `storage` and reset it.
    ///
    /// Storage beyond `u32::MAX` nodes is never handed out.
    #[must_use]
    pub fn with_options(storage: &'p mut [Node<'a>], options: EmitOptions) -> Self {
        let mut pool = Self {
            nodes: storage,
            free: None,
            options,
        };
        pool.reset();
        pool
    }

    /// Discard every node and rebuild the freelist.
    ///
    /// All previously returned handles become dangling.
    pub fn reset(&mut self) {
        let usable = self.capacity();
        let mut next = None;
        for (index, node) in self.nodes.iter_mut().enumerate().take(usable) {
            *node = Node::EMPTY;
            node.sibling = next;
            next = Some(NodeId::new(index));
        }
        self.free = next;
        log::debug!("node pool reset with {usable} nodes");
    }

    /// Pop a node off the freelist and initialize it as an empty `kind`.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when every node is in use.
    pub fn allocate(&mut self, kind: Kind) -> Result<NodeId, PoolError> {
        let Some(id) = self.free else {
            log::warn!("node pool exhausted ({} nodes)", self.capacity());
            return Err(PoolError::Exhausted);
        };
        let node = &mut self.nodes[id.index()];
        self.free = node.sibling;
        *node = Node {
            value: Value::empty(kind),
            ..Node::EMPTY
        };
        Ok(id)
    }

    /// Number of nodes on the freelist.
    ///
    /// Walks the whole freelist; meant for diagnostics.
    #[must_use]
    pub fn available(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.free;
        while let Some(id) = cursor {
            count += 1;
            cursor = self.nodes[id.index()].sibling;
        }
        count
    }

    /// Number of nodes the pool can hand out.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len().min(NodeId::MAX)
    }

    /// Number of nodes currently allocated.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Rendering configuration.
    #[must_use]
    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Replace the rendering configuration.
    pub fn set_options(&mut self, options: EmitOptions) {
        self.options = options;
    }

    // ─── read access ────────────────────────────────────────────────────

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this pool.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        &mut self.nodes[id.index()]
    }

    /// The kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Kind {
        self.node(id).value.kind()
    }

    /// The payload of `id`.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Value<'a> {
        self.node(id).value
    }

    /// The member key of `id`.
    #[must_use]
    pub fn key(&self, id: NodeId) -> Option<&'a BStr> {
        self.node(id).key
    }

    /// Next node in the chain `id` belongs to.
    #[must_use]
    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).sibling
    }

    /// Container `id` belongs to.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Emission progress of `id`.
    #[must_use]
    pub fn state(&self, id: NodeId) -> EmitState {
        self.node(id).state
    }

    /// Elements the regenerator of streaming array `id` last reported as
    /// remaining. `None` before the first refill or for ordinary nodes.
    #[must_use]
    pub fn stream_remaining(&self, id: NodeId) -> Option<usize> {
        self.node(id).stream.and_then(|stream| stream.remaining)
    }

    /// Iterate over the children of a container (empty for scalars).
    #[must_use]
    pub fn children(&self, id: NodeId) -> Chain<'_, 'a, 'p> {
        Chain {
            pool: self,
            next: self.value(id).children(),
        }
    }

    /// Iterate over a sibling chain starting at `head`.
    #[must_use]
    pub fn chain(&self, head: Option<NodeId>) -> Chain<'_, 'a, 'p> {
        Chain { pool: self, next: head }
    }

    /// Pre-order walk over `root`, its following siblings, and all of their
    /// descendants.
    ///
    /// For a parentless `root` this is exactly the set of nodes
    /// [`Pool::emit`] writes. The walk keeps a single cursor and follows
    /// sibling and parent links.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Walk<'_, 'a, 'p> {
        Walk {
            pool: self,
            next: Some(root),
            owner: self.parent(root),
        }
    }

    /// Reset emission state over everything [`Pool::descendants`] yields so
    /// the tree can be emitted again.
    ///
    /// Payloads and links are left alone.
    pub fn rewind(&mut self, root: NodeId) {
        let owner = self.parent(root);
        let mut cursor = Some(root);
        while let Some(id) = cursor {
            self.node_mut(id).rewind();
            cursor = self.successor(id, owner);
        }
    }

    /// Next node of a pre-order walk that stays below `owner`.
    pub(crate) fn successor(&self, id: NodeId, owner: Option<NodeId>) -> Option<NodeId> {
        if let Some(child) = self.value(id).children() {
            return Some(child);
        }
        let mut cursor = id;
        loop {
            if let Some(sibling) = self.sibling(cursor) {
                return Some(sibling);
            }
            match self.parent(cursor) {
                Some(parent) if Some(parent) != owner => cursor = parent,
                _ => return None,
            }
        }
    }
}

/// Iterator over a sibling chain.
#[derive(Debug, Clone)]
pub struct Chain<'t, 'a, 'p> {
    pool: &'t Pool<'a, 'p>,
    next: Option<NodeId>,
}

impl Iterator for Chain<'_, '_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.pool.sibling(id);
        Some(id)
    }
}

/// Pre-order walk returned by [`Pool::descendants`].
#[derive(Debug, Clone)]
pub struct Walk<'t, 'a, 'p> {
    pool: &'t Pool<'a, 'p>,
    next: Option<NodeId>,
    owner: Option<NodeId>,
}

impl Iterator for Walk<'_, '_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.pool.successor(id, self.owner);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    #[test]
    fn reset_makes_every_node_available() {
        let mut storage = [Node::EMPTY; 5];
        let mut pool = Pool::new(&mut storage);
        assert_eq!(pool.available(), 5);
        assert_eq!(pool.capacity(), 5);

        for _ in 0..3 {
            pool.allocate(Kind::Integer).unwrap();
        }
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.in_use(), 3);

        pool.reset();
        assert_eq!(pool.available(), 5);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn allocation_past_capacity_is_exhausted() {
        let mut storage = [Node::EMPTY; 3];
        let mut pool = Pool::new(&mut storage);
        let ids: Vec<_> = (0..3).map(|_| pool.allocate(Kind::Null).unwrap()).collect();

        assert_eq!(pool.allocate(Kind::Null), Err(PoolError::Exhausted));
        assert_eq!(pool.allocate(Kind::Object), Err(PoolError::Exhausted));

        // handles are distinct and untouched by the failed requests
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
        for id in ids {
            assert_eq!(pool.kind(id), Kind::Null);
        }
    }

    #[test]
    fn empty_storage_is_always_exhausted() {
        let mut storage: [Node<'_>; 0] = [];
        let mut pool = Pool::new(&mut storage);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.allocate(Kind::Array), Err(PoolError::Exhausted));
    }

    #[test]
    fn allocate_clears_previous_links_and_state() {
        let mut storage = [Node::EMPTY; 2];
        let mut pool = Pool::new(&mut storage);
        let id = pool.allocate(Kind::Array).unwrap();

        assert_eq!(pool.value(id), Value::Array(None));
        assert_eq!(pool.state(id), EmitState::Unused);
        assert_eq!(pool.sibling(id), None);
        assert_eq!(pool.parent(id), None);
        assert_eq!(pool.key(id), None);
        assert!(!pool.node(id).is_streaming());
    }

    #[test]
    fn reset_discards_a_built_tree() {
        let mut storage = [Node::EMPTY; 4];
        let mut pool = Pool::new(&mut storage);
        let one = pool.integer(1).unwrap();
        let two = pool.integer(2).unwrap();
        pool.array(&[one, two]).unwrap();
        assert_eq!(pool.available(), 1);

        pool.reset();
        assert_eq!(pool.available(), pool.capacity());
        let fresh = pool.allocate(Kind::String).unwrap();
        assert_eq!(pool.sibling(fresh), None);
        assert_eq!(pool.parent(fresh), None);
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let mut storage = [Node::EMPTY; 8];
        let mut pool = Pool::new(&mut storage);
        let a = pool.integer(1).unwrap();
        let b = pool.integer(2).unwrap();
        let inner = pool.array(&[a, b]).unwrap();
        let c = pool.null().unwrap();
        let empty = pool.object(&[]).unwrap();
        let root = pool.array(&[inner, c, empty]).unwrap();

        let order: Vec<_> = pool.descendants(root).collect();
        assert_eq!(order, [root, inner, a, b, c, empty]);

        // a subtree walk stays inside the subtree's chain
        let order: Vec<_> = pool.descendants(inner).collect();
        assert_eq!(order, [inner, a, b, c, empty]);
    }
}
