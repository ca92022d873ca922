//! Building and mutating trees on top of pool nodes.
//!
//! Every constructor allocates from the pool and hands back a [`NodeId`], or
//! [`PoolError::Exhausted`] once the pool is empty. Composite values are made
//! from handles that already exist, so trees are built inside out:
//!
//! ```rust
//! use jsonpool::{Node, Pool};
//!
//! let mut storage = [Node::EMPTY; 8];
//! let mut pool = Pool::new(&mut storage);
//!
//! let one = pool.integer(1)?;
//! let a = pool.keyed("a", one);
//! let flags = [pool.true_()?, pool.false_()?, pool.null()?];
//! let flags = pool.array(&flags)?;
//! let b = pool.keyed("b", flags);
//! let root = pool.object(&[a, b])?;
//!
//! assert_eq!(pool.children(root).count(), 2);
//! # Ok::<(), jsonpool::PoolError>(())
//! ```
//!
//! Payload setters may be used between emission passes. They do not touch the
//! emission state, and calling them while a pass is suspended is the caller's
//! responsibility.

use bstr::BStr;

use crate::{
    error::PoolError,
    node::{Kind, NodeId, Regenerator, Stream, Value},
    pool::Pool,
};

impl<'a> Pool<'a, '_> {
    // ─── scalars ────────────────────────────────────────────────────────

    /// A `null` node.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn null(&mut self) -> Result<NodeId, PoolError> {
        self.allocate(Kind::Null)
    }

    /// A boolean node.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn boolean(&mut self, value: bool) -> Result<NodeId, PoolError> {
        self.scalar(Value::Bool(value))
    }

    /// A `true` node.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn true_(&mut self) -> Result<NodeId, PoolError> {
        self.boolean(true)
    }

    /// A `false` node.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn false_(&mut self) -> Result<NodeId, PoolError> {
        self.boolean(false)
    }

    /// An integer node.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn integer(&mut self, value: i64) -> Result<NodeId, PoolError> {
        self.scalar(Value::Integer(value))
    }

    /// A float node. Integral values render without a fractional part.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn float(&mut self, value: f64) -> Result<NodeId, PoolError> {
        self.scalar(Value::Float(value))
    }

    /// A string node borrowing `value`.
    ///
    /// The bytes are written verbatim between quotes; no escaping is applied.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn string<S>(&mut self, value: &'a S) -> Result<NodeId, PoolError>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        self.scalar(Value::String(BStr::new(value)))
    }

    fn scalar(&mut self, value: Value<'a>) -> Result<NodeId, PoolError> {
        let id = self.allocate(value.kind())?;
        self.node_mut(id).value = value;
        Ok(id)
    }

    /// Give `id` a member key so it renders as `"key":value` inside an
    /// object. Returns `id`.
    pub fn keyed<K>(&mut self, key: &'a K, id: NodeId) -> NodeId
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.node_mut(id).key = Some(BStr::new(key));
        id
    }

    // ─── containers ─────────────────────────────────────────────────────

    /// An array holding `elements` in order.
    ///
    /// Each element becomes a child of the new array; whatever sibling an
    /// element had before is overwritten. An empty slice makes an empty array
    /// that can be appended to later.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn array(&mut self, elements: &[NodeId]) -> Result<NodeId, PoolError> {
        self.container(Kind::Array, elements)
    }

    /// An object holding `members` in order. Members are expected to carry
    /// keys (see [`Pool::keyed`]).
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn object(&mut self, members: &[NodeId]) -> Result<NodeId, PoolError> {
        self.container(Kind::Object, members)
    }

    /// An array whose children are refilled by `regenerate` each time they
    /// have been written, so its rendered length is not bounded by the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the pool is full.
    pub fn streaming_array(
        &mut self,
        regenerate: Regenerator<'a>,
        elements: &[NodeId],
    ) -> Result<NodeId, PoolError> {
        let id = self.array(elements)?;
        self.node_mut(id).stream = Some(Stream::new(regenerate));
        Ok(id)
    }

    /// Attach a regenerator to an existing array.
    ///
    /// # Errors
    ///
    /// [`PoolError::KindMismatch`] if `array` is not an array.
    pub fn set_regenerator(
        &mut self,
        array: NodeId,
        regenerate: Regenerator<'a>,
    ) -> Result<NodeId, PoolError> {
        self.expect_kind(array, Kind::Array)?;
        self.node_mut(array).stream = Some(Stream::new(regenerate));
        Ok(array)
    }

    fn container(&mut self, kind: Kind, elements: &[NodeId]) -> Result<NodeId, PoolError> {
        let id = self.allocate(kind)?;
        let head = self.link(elements, Some(id));
        self.set_children(id, head);
        Ok(id)
    }

    // ─── lists ──────────────────────────────────────────────────────────

    /// Chain `elements` into a list that belongs to no container yet.
    ///
    /// The returned head can later be handed to [`Pool::array_append`] or
    /// [`Pool::object_append`]. Returns `None` for an empty slice.
    pub fn list(&mut self, elements: &[NodeId]) -> Option<NodeId> {
        self.link(elements, None)
    }

    /// Splice the chain starting at `items` onto the end of `list`.
    ///
    /// Returns the head of the combined list, which is `items` when `list` is
    /// `None`. Walks `list` to find its tail.
    pub fn list_append(&mut self, list: Option<NodeId>, items: NodeId) -> NodeId {
        let Some(head) = list else {
            return items;
        };
        let parent = self.parent(head);
        self.splice(head, items, parent);
        head
    }

    /// Append the chain starting at `items` to an array. Returns `array`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotContainer`] for scalars and
    /// [`PoolError::KindMismatch`] for objects.
    pub fn array_append(&mut self, array: NodeId, items: NodeId) -> Result<NodeId, PoolError> {
        self.append(array, Kind::Array, items)
    }

    /// Append the chain starting at `items` to an object. Returns `object`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotContainer`] for scalars and
    /// [`PoolError::KindMismatch`] for arrays.
    pub fn object_append(&mut self, object: NodeId, items: NodeId) -> Result<NodeId, PoolError> {
        self.append(object, Kind::Object, items)
    }

    /// Key `value` and append it to `object`. Returns `object`.
    ///
    /// # Errors
    ///
    /// As [`Pool::object_append`].
    pub fn object_add<K>(
        &mut self,
        object: NodeId,
        key: &'a K,
        value: NodeId,
    ) -> Result<NodeId, PoolError>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let value = self.keyed(key, value);
        self.object_append(object, value)
    }

    /// Make the chain starting at `items` the entire contents of `container`.
    /// Returns `container`.
    ///
    /// The previous children are detached and stay allocated until the next
    /// [`Pool::reset`]. Regenerators use this to swap in a fresh batch.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotContainer`] for scalars.
    pub fn replace_children(
        &mut self,
        container: NodeId,
        items: Option<NodeId>,
    ) -> Result<NodeId, PoolError> {
        if !self.kind(container).is_container() {
            return Err(PoolError::NotContainer(container));
        }
        if let Some(items) = items {
            self.stamp_parent(items, Some(container));
        }
        self.set_children(container, items);
        Ok(container)
    }

    fn append(&mut self, container: NodeId, kind: Kind, items: NodeId) -> Result<NodeId, PoolError> {
        if !self.kind(container).is_container() {
            return Err(PoolError::NotContainer(container));
        }
        self.expect_kind(container, kind)?;

        match self.value(container).children() {
            Some(head) => self.splice(head, items, Some(container)),
            None => {
                self.stamp_parent(items, Some(container));
                self.set_children(container, Some(items));
            }
        }
        Ok(container)
    }

    /// Link `elements` into a chain owned by `parent` and return its head.
    fn link(&mut self, elements: &[NodeId], parent: Option<NodeId>) -> Option<NodeId> {
        for pair in elements.windows(2) {
            self.node_mut(pair[0]).sibling = Some(pair[1]);
        }
        if let Some(&last) = elements.last() {
            self.node_mut(last).sibling = None;
        }
        for &element in elements {
            self.node_mut(element).parent = parent;
        }
        elements.first().copied()
    }

    fn splice(&mut self, head: NodeId, items: NodeId, parent: Option<NodeId>) {
        let mut tail = head;
        while let Some(next) = self.sibling(tail) {
            tail = next;
        }
        self.node_mut(tail).sibling = Some(items);
        self.stamp_parent(items, parent);
    }

    fn stamp_parent(&mut self, items: NodeId, parent: Option<NodeId>) {
        let mut cursor = Some(items);
        while let Some(id) = cursor {
            self.node_mut(id).parent = parent;
            cursor = self.sibling(id);
        }
    }

    fn set_children(&mut self, id: NodeId, head: Option<NodeId>) {
        if let Value::Object(children) | Value::Array(children) = &mut self.node_mut(id).value {
            *children = head;
        }
    }

    // ─── payload setters ────────────────────────────────────────────────

    /// Overwrite the value of an integer node.
    ///
    /// # Errors
    ///
    /// [`PoolError::KindMismatch`] if `id` is not an integer.
    pub fn set_integer(&mut self, id: NodeId, value: i64) -> Result<NodeId, PoolError> {
        self.set_scalar(id, Value::Integer(value))
    }

    /// Overwrite the value of a float node.
    ///
    /// # Errors
    ///
    /// [`PoolError::KindMismatch`] if `id` is not a float.
    pub fn set_float(&mut self, id: NodeId, value: f64) -> Result<NodeId, PoolError> {
        self.set_scalar(id, Value::Float(value))
    }

    /// Point a string node at new bytes.
    ///
    /// # Errors
    ///
    /// [`PoolError::KindMismatch`] if `id` is not a string.
    pub fn set_string<S>(&mut self, id: NodeId, value: &'a S) -> Result<NodeId, PoolError>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        self.set_scalar(id, Value::String(BStr::new(value)))
    }

    /// Overwrite the value of a boolean node.
    ///
    /// # Errors
    ///
    /// [`PoolError::KindMismatch`] if `id` is not a boolean.
    pub fn set_bool(&mut self, id: NodeId, value: bool) -> Result<NodeId, PoolError> {
        self.set_scalar(id, Value::Bool(value))
    }

    fn set_scalar(&mut self, id: NodeId, value: Value<'a>) -> Result<NodeId, PoolError> {
        self.expect_kind(id, value.kind())?;
        self.node_mut(id).value = value;
        Ok(id)
    }

    fn expect_kind(&self, id: NodeId, expected: Kind) -> Result<(), PoolError> {
        let found = self.kind(id);
        if found == expected {
            Ok(())
        } else {
            Err(PoolError::KindMismatch {
                node: id,
                expected,
                found,
            })
        }
    }

    // ─── deep copy ──────────────────────────────────────────────────────

    /// Copy `root` and everything below it into fresh nodes.
    ///
    /// Keys, scalar values and regenerators are carried over; strings stay
    /// borrowed from the same storage. The copy has no parent and no sibling
    /// and starts with a fresh emission state. `root`'s own siblings are not
    /// copied.
    ///
    /// The walk follows parent links instead of recursing, so it needs no
    /// stack proportional to the depth of the tree.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] if the pool runs out; nodes copied so far stay
    /// allocated.
    pub fn deep_copy(&mut self, root: NodeId) -> Result<NodeId, PoolError> {
        let top = self.clone_node(root)?;
        let (mut src, mut dst) = (root, top);
        loop {
            if let Some(child) = self.value(src).children() {
                let copy = self.clone_node(child)?;
                self.node_mut(copy).parent = Some(dst);
                self.set_children(dst, Some(copy));
                (src, dst) = (child, copy);
                continue;
            }
            loop {
                if src == root {
                    return Ok(top);
                }
                if let Some(next) = self.sibling(src) {
                    let copy = self.clone_node(next)?;
                    self.node_mut(copy).parent = self.parent(dst);
                    self.node_mut(dst).sibling = Some(copy);
                    (src, dst) = (next, copy);
                    break;
                }
                match (self.parent(src), self.parent(dst)) {
                    (Some(up), Some(copy_up)) => (src, dst) = (up, copy_up),
                    _ => return Ok(top),
                }
            }
        }
    }

    /// A fresh, unlinked node with the payload, key and regenerator of `src`.
    fn clone_node(&mut self, src: NodeId) -> Result<NodeId, PoolError> {
        let original = *self.node(src);
        let id = self.allocate(original.value.kind())?;
        let node = self.node_mut(id);
        if !original.value.kind().is_container() {
            node.value = original.value;
        }
        node.key = original.key;
        node.stream = original.stream.map(Stream::rewound);
        Ok(id)
    }
}
