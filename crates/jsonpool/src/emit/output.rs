/// Receiver of emitted bytes.
///
/// The engine calls [`ByteSink::write_byte`] once for every byte it emits and
/// once more with the terminator when a pass completes. Any `FnMut(u8)`
/// closure is a sink, so the caller's context is whatever the closure
/// captures.
pub trait ByteSink {
    /// Accept one byte.
    fn write_byte(&mut self, byte: u8);
}

impl<F: FnMut(u8)> ByteSink for F {
    #[inline]
    fn write_byte(&mut self, byte: u8) {
        self(byte);
    }
}

/// Bounded output window for one emission call.
///
/// The engine copies every emitted byte into the window and raises the full
/// flag as soon as a fragment does not fit. Before resuming, the caller
/// drains [`OutBuf::as_bytes`] and calls [`OutBuf::clear`], or starts over
/// with a fresh window.
///
/// # Examples
///
/// ```rust
/// use jsonpool::{Node, OutBuf, Pool, Progress};
///
/// let mut storage = [Node::EMPTY; 1];
/// let mut pool = Pool::new(&mut storage);
/// let root = pool.string("hello")?;
///
/// let mut window = [0u8; 4];
/// let mut out = OutBuf::new(&mut window);
/// let mut sent = Vec::new();
/// let mut cursor = root;
/// loop {
///     let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
///     sent.extend_from_slice(out.as_bytes());
///     out.clear();
///     match progress {
///         Progress::Complete => break,
///         Progress::Suspended(at) => cursor = at,
///     }
/// }
/// assert_eq!(sent, b"\"hello\"");
/// # Ok::<(), jsonpool::PoolError>(())
/// ```
#[derive(Debug)]
pub struct OutBuf<'b> {
    buf: &'b mut [u8],
    limit: usize,
    len: usize,
    full: bool,
}

impl<'b> OutBuf<'b> {
    /// A window over `buf`; its length is the capacity per call.
    ///
    /// `buf` must not be empty: a zero-byte window can never make progress,
    /// so every [`Pool::emit`](crate::Pool::emit) call would suspend at the
    /// same node.
    ///
    /// # Panics
    ///
    /// In debug builds, if `buf` is empty.
    #[must_use]
    pub fn new(buf: &'b mut [u8]) -> Self {
        debug_assert!(!buf.is_empty(), "output window needs at least one byte");
        let limit = buf.len();
        Self {
            buf,
            limit,
            len: 0,
            full: false,
        }
    }

    /// A window without a limit that stores nothing; bytes reach only the
    /// sink.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            buf: &mut [],
            limit: usize::MAX,
            len: 0,
            full: false,
        }
    }

    /// Bytes the window accepts per call.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Bytes emitted into the window since the last [`OutBuf::clear`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been emitted since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Room left before the window is full.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.len
    }

    /// Set by the engine when a fragment did not fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// The bytes held by the window. Always empty for
    /// [`OutBuf::unbounded`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len.min(self.buf.len())]
    }

    /// Drain the window and lower the full flag.
    pub fn clear(&mut self) {
        self.len = 0;
        self.full = false;
    }

    pub(crate) fn push(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.len) {
            *slot = byte;
        }
        self.len += 1;
    }

    pub(crate) fn mark_full(&mut self) {
        self.full = true;
    }
}
