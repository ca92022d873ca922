//! JSON trees in a fixed node pool, serialized by a resumable emitter.
//!
//! `jsonpool` never allocates. The caller hands a [`Pool`] a slice of
//! [`Node`]s; constructors pop nodes off the pool's freelist and link them
//! into a tree of sibling chains. [`Pool::emit`] then writes the tree as JSON
//! text through a [`ByteSink`], stopping whenever the caller's [`OutBuf`]
//! window is full and continuing later from exactly the same place. The walk
//! keeps a single cursor, so stack use does not grow with nesting depth.
//!
//! ```rust
//! use jsonpool::{Node, OutBuf, Pool, Progress};
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
//! // a 5-byte transmit buffer
//! let mut window = [0u8; 5];
//! let mut out = OutBuf::new(&mut window);
//! let mut sent = Vec::new();
//! let mut cursor = root;
//! loop {
//!     let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
//!     sent.extend_from_slice(out.as_bytes());
//!     out.clear();
//!     match progress {
//!         Progress::Complete => break,
//!         Progress::Suspended(at) => cursor = at,
//!     }
//! }
//! assert_eq!(sent, br#"{"a":1,"b":[true,false,null]}"#);
//! # Ok::<(), jsonpool::PoolError>(())
//! ```
//!
//! Arrays whose length exceeds the pool can be streamed; see
//! [`Pool::streaming_array`] and [`Regenerator`].

#![no_std]

#[cfg(test)]
extern crate std;

mod emit;
mod error;
mod node;
mod options;
mod pool;
#[cfg(any(test, feature = "serde"))]
mod serde;
mod tree;

#[cfg(test)]
mod tests;

pub use emit::{ByteSink, OutBuf, Progress};
pub use error::PoolError;
pub use node::{EmitState, Kind, Node, NodeId, Regenerator, Value};
pub use options::EmitOptions;
pub use pool::{Chain, Pool, Walk};
#[cfg(any(test, feature = "serde"))]
pub use self::serde::Tree;
