/// Configuration for how a [`Pool`](crate::Pool) renders its trees.
///
/// # Examples
///
/// ```rust
/// use jsonpool::{EmitOptions, Node, Pool};
///
/// let mut storage = [Node::EMPTY; 8];
/// let pool = Pool::with_options(
///     &mut storage,
///     EmitOptions {
///         terminator: Some(b'\n'),
///         ..Default::default()
///     },
/// );
/// assert_eq!(pool.options().float_precision, 6);
/// ```
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Byte handed to the sink once a pass completes.
    ///
    /// The terminator never lands in the output window and never counts
    /// against its capacity. `None` disables it.
    ///
    /// # Default
    ///
    /// `Some(b'\0')`
    pub terminator: Option<u8>,

    /// Number of fractional digits used for floats that are not exactly
    /// integral.
    ///
    /// Integral floats such as `3.0` always render without a fractional part.
    ///
    /// # Default
    ///
    /// `6`
    pub float_precision: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            terminator: Some(b'\0'),
            float_precision: 6,
        }
    }
}
