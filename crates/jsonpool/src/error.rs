use thiserror::Error;

use crate::node::{Kind, NodeId};

/// Errors reported by pool construction and mutation operations.
///
/// Running out of room in the output window is not an error; the emitter
/// reports it as [`Progress::Suspended`](crate::Progress::Suspended).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every node in the pool is in use.
    #[error("node pool exhausted")]
    Exhausted,
    /// Items can only be appended to objects and arrays.
    #[error("node {0} is not an object or array")]
    NotContainer(NodeId),
    /// A scalar setter was applied to a node of another kind.
    #[error("node {node} holds {found}, expected {expected}")]
    KindMismatch {
        /// The node that was addressed.
        node: NodeId,
        /// The kind the setter writes.
        expected: Kind,
        /// The kind the node actually holds.
        found: Kind,
    },
}
