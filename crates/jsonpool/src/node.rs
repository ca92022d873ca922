//! The node entity and the handles that link nodes together.
//!
//! A tree is a set of [`Node`]s living in one pool. Containers point at the
//! first node of their children chain; every node points at its next sibling
//! and back at its enclosing container. All links are [`NodeId`] handles, so a
//! traversal only ever needs a single cursor.

use core::fmt;

use bstr::BStr;

use crate::pool::Pool;

/// Handle to a node inside a [`Pool`].
///
/// Handles are plain indices. A handle is only meaningful for the pool that
/// produced it.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const MAX: usize = u32::MAX as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= Self::MAX);
        Self(index as u32)
    }

    /// Position of the node in the pool storage.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The JSON type a node holds.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// A signed 64-bit integer.
    Integer,
    /// A double, rendered as an integer when it is integral.
    Float,
    /// A borrowed byte string.
    String,
    /// `{...}` with keyed children.
    Object,
    /// `[...]`
    Array,
}

impl Kind {
    /// `true` for objects and arrays.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        })
    }
}

/// Payload of a node.
///
/// Strings are borrowed from the caller for `'a` and are never copied.
/// Containers carry the head of their children chain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(&'a BStr),
    /// Head of the members chain.
    Object(Option<NodeId>),
    /// Head of the elements chain.
    Array(Option<NodeId>),
}

impl Value<'_> {
    /// The kind of this payload.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Integer(_) => Kind::Integer,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Object(_) => Kind::Object,
            Self::Array(_) => Kind::Array,
        }
    }

    /// First child of an object or array.
    #[must_use]
    pub fn children(&self) -> Option<NodeId> {
        match self {
            Self::Object(head) | Self::Array(head) => *head,
            _ => None,
        }
    }

    pub(crate) fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Null => Self::Null,
            Kind::Bool => Self::Bool(false),
            Kind::Integer => Self::Integer(0),
            Kind::Float => Self::Float(0.0),
            Kind::String => Self::String(BStr::new(b"")),
            Kind::Object => Self::Object(None),
            Kind::Array => Self::Array(None),
        }
    }
}

/// Progress of a node through an emission pass.
///
/// Every node type walks a subsequence of these states; see
/// [`Pool::emit`](crate::Pool::emit).
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitState {
    /// Nothing of this node has been written yet.
    #[default]
    Unused,
    /// The `"key":` prefix (if any) has been written.
    KeyEmitted,
    /// The opening bracket of a container has been written.
    ContainerBegun,
    /// A scalar value has been written; its separator may still be pending.
    ValueEmitted,
    /// Every child of a container has been written; the closing bracket is
    /// pending.
    ChildrenEmitted,
    /// The node is fully written, separator included.
    Done,
}

/// Callback that refills a streaming array's children between batches.
///
/// The engine calls it with the pool and the array's handle once the current
/// children have been written. It rewrites or replaces the children and
/// returns:
///
/// - `Some(n)`: a fresh batch is in place and `n` logical elements remain
///   after it. `Some(0)` marks the batch as the last one.
/// - `None`: there is nothing more; the array is closed.
///
/// The count is kept on the array node, readable through
/// [`Pool::stream_remaining`].
///
/// A batch may be empty, in which case the engine asks again right away. A
/// regenerator must therefore eventually produce elements, return `Some(0)`
/// or return `None`; one that keeps leaving the array empty while reporting
/// elements remaining never lets the pass finish.
///
/// When the regenerator cannot build its batch, for instance because
/// [`Pool::allocate`] reported [`PoolError::Exhausted`](crate::PoolError),
/// returning `None` closes the array after what has been written so far.
pub type Regenerator<'a> = for<'p> fn(&mut Pool<'a, 'p>, NodeId) -> Option<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamPhase {
    /// Writing the current batch; the next stop asks for a refill.
    Draining,
    /// A refill produced a batch whose separator is not written yet.
    Refilled,
    /// No further batches.
    Closed,
}

#[derive(Clone, Copy)]
pub(crate) struct Stream<'a> {
    pub(crate) regenerate: Regenerator<'a>,
    pub(crate) remaining: Option<usize>,
    pub(crate) phase: StreamPhase,
    /// Whether any element of this array has been written in the current pass.
    pub(crate) started: bool,
}

impl<'a> Stream<'a> {
    pub(crate) fn new(regenerate: Regenerator<'a>) -> Self {
        Self {
            regenerate,
            remaining: None,
            phase: StreamPhase::Draining,
            started: false,
        }
    }

    pub(crate) fn rewound(self) -> Self {
        Self::new(self.regenerate)
    }
}

impl fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("remaining", &self.remaining)
            .field("phase", &self.phase)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// A single slot of pool storage.
///
/// Callers only create nodes to provide storage, usually as
/// `[Node::EMPTY; N]`; everything else goes through [`Pool`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub(crate) value: Value<'a>,
    pub(crate) state: EmitState,
    pub(crate) key: Option<&'a BStr>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) stream: Option<Stream<'a>>,
    /// Bytes of an oversized fragment already written.
    pub(crate) written: usize,
}

impl Node<'_> {
    /// A zeroed node, suitable for initializing pool storage.
    pub const EMPTY: Self = Self {
        value: Value::Null,
        state: EmitState::Unused,
        key: None,
        sibling: None,
        parent: None,
        stream: None,
        written: 0,
    };
}

impl Default for Node<'_> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<'a> Node<'a> {
    /// The node's payload.
    #[must_use]
    pub fn value(&self) -> Value<'a> {
        self.value
    }

    /// The node's member key, if it sits inside an object.
    #[must_use]
    pub fn key(&self) -> Option<&'a BStr> {
        self.key
    }

    /// Next node in the same chain.
    #[must_use]
    pub fn sibling(&self) -> Option<NodeId> {
        self.sibling
    }

    /// Enclosing container.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Emission progress.
    #[must_use]
    pub fn state(&self) -> EmitState {
        self.state
    }

    /// Whether this array is refilled through a [`Regenerator`].
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub(crate) fn rewind(&mut self) {
        self.state = EmitState::Unused;
        self.written = 0;
        if let Some(stream) = self.stream {
            self.stream = Some(stream.rewound());
        }
    }
}
