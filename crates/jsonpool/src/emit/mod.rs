//! Resumable, constant-stack JSON emission.
//!
//! [`Pool::emit`] walks a tree with a single cursor, following children,
//! sibling and parent links. Each node records how far it got in
//! [`EmitState`], so a pass that stops because the output window is full can
//! be picked up again from the node it returned.

mod fragment;
mod output;

pub use output::{ByteSink, OutBuf};

#[cfg(any(test, feature = "serde"))]
pub(crate) use self::fragment::{FloatForm, classify};
use self::fragment::Fragment;
use crate::{
    node::{EmitState, NodeId, StreamPhase, Value},
    pool::Pool,
};

/// Outcome of a call to [`Pool::emit`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The whole tree has been written and the terminator was sent.
    Complete,
    /// The window filled up. Drain it and call again with this node.
    Suspended(NodeId),
}

impl Progress {
    /// Whether the pass has finished.
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Node to resume from, if the pass was suspended.
    #[must_use]
    pub fn resume_at(self) -> Option<NodeId> {
        match self {
            Self::Complete => None,
            Self::Suspended(id) => Some(id),
        }
    }
}

/// What the driver does after one step of a node's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The node advanced; step it again.
    Again,
    /// Move the cursor to this child.
    Descend(NodeId),
    /// The node is done; move on to its sibling or parent.
    Finished,
    /// The window is full; suspend at the current node.
    Full,
}

impl<'a> Pool<'a, '_> {
    /// Write the tree at `root` to `sink`, mirroring every byte into `out`.
    ///
    /// The first call of a pass takes a root without a parent: a top-level
    /// value, or the head of a list, in which case every value of the list is
    /// written back to back. Emission stops when the whole tree has been
    /// written, returning [`Progress::Complete`] after the configured
    /// terminator went to the sink, or when the next fragment does not fit in
    /// `out`, returning [`Progress::Suspended`]. Resume by draining or
    /// clearing `out` and calling again with the returned node; calling with
    /// the original root instead would close containers early.
    ///
    /// A fragment (key, bracket, scalar, separator) is only ever written
    /// whole. The single exception is a fragment longer than the window's
    /// entire capacity, which is written in window-sized slices.
    ///
    /// A finished tree stays finished. To emit it again call
    /// [`Pool::rewind`] first. Mutating nodes while a pass is suspended, or
    /// handing in a tree with cycles, is not supported.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonpool::{Node, OutBuf, Pool, Progress};
    ///
    /// let mut storage = [Node::EMPTY; 4];
    /// let mut pool = Pool::new(&mut storage);
    /// let one = pool.integer(1)?;
    /// let two = pool.float(2.5)?;
    /// let root = pool.array(&[one, two])?;
    ///
    /// let mut text = Vec::new();
    /// let progress = pool.emit(root, &mut |b: u8| text.push(b), &mut OutBuf::unbounded());
    /// assert_eq!(progress, Progress::Complete);
    /// assert_eq!(text, b"[1,2.500000]\0");
    /// # Ok::<(), jsonpool::PoolError>(())
    /// ```
    pub fn emit<S>(&mut self, root: NodeId, sink: &mut S, out: &mut OutBuf<'_>) -> Progress
    where
        S: ByteSink + ?Sized,
    {
        if out.is_full() {
            return Progress::Suspended(root);
        }
        let mut cursor = root;
        loop {
            match self.step(cursor, sink, out) {
                Step::Again => {}
                Step::Descend(child) => cursor = child,
                Step::Finished => match self.sibling(cursor).or_else(|| self.parent(cursor)) {
                    Some(next) => cursor = next,
                    None => {
                        if let Some(terminator) = self.options().terminator {
                            sink.write_byte(terminator);
                        }
                        log::trace!("emission of {root} complete");
                        return Progress::Complete;
                    }
                },
                Step::Full => {
                    log::trace!("emission suspended at {cursor} after {} bytes", out.len());
                    return Progress::Suspended(cursor);
                }
            }
        }
    }

    fn step<S>(&mut self, id: NodeId, sink: &mut S, out: &mut OutBuf<'_>) -> Step
    where
        S: ByteSink + ?Sized,
    {
        let node = *self.node(id);
        match node.state {
            EmitState::Unused => match node.key {
                Some(key) => self.put(id, Fragment::Key(key), EmitState::KeyEmitted, sink, out),
                None => self.advance(id, EmitState::KeyEmitted),
            },
            EmitState::KeyEmitted => {
                let next = if node.value.kind().is_container() {
                    EmitState::ContainerBegun
                } else {
                    EmitState::ValueEmitted
                };
                let opening = Fragment::opening(node.value, self.options().float_precision);
                self.put(id, opening, next, sink, out)
            }
            EmitState::ContainerBegun => {
                let head = node.value.children();
                let entry = self.node_mut(id);
                entry.state = EmitState::ChildrenEmitted;
                if let Some(stream) = &mut entry.stream {
                    stream.started = head.is_some();
                }
                head.map_or(Step::Again, Step::Descend)
            }
            EmitState::ValueEmitted => {
                if node.sibling.is_some() {
                    self.put(id, Fragment::Raw(b","), EmitState::Done, sink, out)
                } else {
                    self.advance(id, EmitState::Done)
                }
            }
            EmitState::ChildrenEmitted => {
                if node.stream.is_some() {
                    if let Some(step) = self.refill(id, sink, out) {
                        return step;
                    }
                }
                let close: &'static [u8] = match (node.value, node.sibling.is_some()) {
                    (Value::Object(_), false) => b"}",
                    (Value::Object(_), true) => b"},",
                    (Value::Array(_), false) => b"]",
                    (Value::Array(_), true) => b"],",
                    _ => return self.advance(id, EmitState::Done),
                };
                self.put(id, Fragment::Raw(close), EmitState::Done, sink, out)
            }
            EmitState::Done => Step::Finished,
        }
    }

    /// Streaming arrays: decide whether the array closes now (`None`) or
    /// another batch is written first.
    fn refill<S>(&mut self, id: NodeId, sink: &mut S, out: &mut OutBuf<'_>) -> Option<Step>
    where
        S: ByteSink + ?Sized,
    {
        let stream = self.node(id).stream?;
        match stream.phase {
            StreamPhase::Closed => return None,
            StreamPhase::Draining if stream.remaining == Some(0) => {
                self.set_phase(id, StreamPhase::Closed);
                return None;
            }
            StreamPhase::Draining => {
                let remaining = (stream.regenerate)(self, id);
                log::trace!("regenerated {id}, remaining {remaining:?}");
                let Some(remaining) = remaining else {
                    self.set_phase(id, StreamPhase::Closed);
                    return None;
                };
                if let Some(stream) = &mut self.node_mut(id).stream {
                    stream.remaining = Some(remaining);
                    stream.phase = StreamPhase::Refilled;
                }
                if let Some(head) = self.value(id).children() {
                    self.rewind(head);
                }
            }
            StreamPhase::Refilled => {}
        }

        let Some(head) = self.value(id).children() else {
            // an empty batch; ask again
            self.set_phase(id, StreamPhase::Draining);
            return Some(Step::Again);
        };
        let started = self.node(id).stream.is_some_and(|stream| stream.started);
        if started && !self.write(id, Fragment::Raw(b","), sink, out) {
            return Some(Step::Full);
        }
        if let Some(stream) = &mut self.node_mut(id).stream {
            stream.started = true;
            stream.phase = StreamPhase::Draining;
        }
        Some(Step::Descend(head))
    }

    fn set_phase(&mut self, id: NodeId, phase: StreamPhase) {
        if let Some(stream) = &mut self.node_mut(id).stream {
            stream.phase = phase;
        }
    }

    fn advance(&mut self, id: NodeId, next: EmitState) -> Step {
        self.node_mut(id).state = next;
        Step::Again
    }

    /// Write `fragment` for `id` and move it to `next`, or report a full
    /// window and leave the state alone.
    fn put<S>(
        &mut self,
        id: NodeId,
        fragment: Fragment<'a>,
        next: EmitState,
        sink: &mut S,
        out: &mut OutBuf<'_>,
    ) -> Step
    where
        S: ByteSink + ?Sized,
    {
        if self.write(id, fragment, sink, out) {
            self.advance(id, next)
        } else {
            Step::Full
        }
    }

    /// Returns `true` once the whole fragment has been written.
    ///
    /// A fragment that fits in the remaining room is written at once. One
    /// that could never fit in the window is written slice by slice, the
    /// node's `written` offset remembering where the last slice ended.
    fn write<S>(&mut self, id: NodeId, fragment: Fragment<'a>, sink: &mut S, out: &mut OutBuf<'_>) -> bool
    where
        S: ByteSink + ?Sized,
    {
        let len = fragment.len();
        let node = self.node_mut(id);
        let rest = len.saturating_sub(node.written);
        if rest <= out.remaining() {
            fragment.write(node.written, rest, sink, out);
            node.written = 0;
            return true;
        }
        if len > out.capacity() && out.remaining() > 0 {
            let take = out.remaining();
            fragment.write(node.written, take, sink, out);
            node.written += take;
        }
        out.mark_full();
        false
    }
}
