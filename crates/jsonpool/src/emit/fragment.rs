//! Text fragments and how they are sized and written.
//!
//! A fragment is the unit the engine writes atomically: a key prefix, a
//! bracket, a scalar, a separator. Sizes are measured by rendering into a
//! counter first, so numbers never need a scratch buffer.

use core::fmt::{self, Write as _};

use bstr::BStr;

use super::output::{ByteSink, OutBuf};
use crate::node::Value;

/// 2^53: beyond this an `f64` no longer represents every integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Fragment<'a> {
    Raw(&'static [u8]),
    /// `"key":`
    Key(&'a BStr),
    /// `"value"`
    Quoted(&'a BStr),
    Integer(i64),
    Float { value: f64, precision: usize },
}

impl<'a> Fragment<'a> {
    /// The first fragment of a value: an opening bracket or the whole scalar.
    pub(crate) fn opening(value: Value<'a>, precision: usize) -> Self {
        match value {
            Value::Null => Self::Raw(b"null"),
            Value::Bool(true) => Self::Raw(b"true"),
            Value::Bool(false) => Self::Raw(b"false"),
            Value::Integer(value) => Self::Integer(value),
            Value::Float(value) => Self::Float { value, precision },
            Value::String(value) => Self::Quoted(value),
            Value::Object(_) => Self::Raw(b"{"),
            Value::Array(_) => Self::Raw(b"["),
        }
    }

    pub(crate) fn len(&self) -> usize {
        let mut counter = Counter(0);
        self.render(&mut counter);
        counter.0
    }

    /// Write `take` bytes of the fragment, starting `skip` bytes in.
    pub(crate) fn write<S: ByteSink + ?Sized>(
        &self,
        skip: usize,
        take: usize,
        sink: &mut S,
        out: &mut OutBuf<'_>,
    ) {
        self.render(&mut Window {
            skip,
            take,
            sink,
            out,
        });
    }

    fn render<O: Out + ?Sized>(&self, out: &mut O) {
        match *self {
            Self::Raw(bytes) => out.put(bytes),
            Self::Key(key) => {
                out.put(b"\"");
                out.put(key);
                out.put(b"\":");
            }
            Self::Quoted(value) => {
                out.put(b"\"");
                out.put(value);
                out.put(b"\"");
            }
            Self::Integer(value) => {
                // formatting into `Fmt` cannot fail
                let _ = write!(Fmt(out), "{value}");
            }
            Self::Float { value, precision } => match classify(value) {
                FloatForm::NotFinite => out.put(b"null"),
                FloatForm::Integral(value) => {
                    let _ = write!(Fmt(out), "{value}");
                }
                FloatForm::Fixed => {
                    let _ = write!(Fmt(out), "{value:.precision$}");
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FloatForm {
    NotFinite,
    Integral(i64),
    Fixed,
}

/// How a float renders: integral values drop their fractional part.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn classify(value: f64) -> FloatForm {
    if !value.is_finite() {
        return FloatForm::NotFinite;
    }
    if -EXACT_INTEGER_LIMIT < value && value < EXACT_INTEGER_LIMIT {
        let truncated = value as i64;
        if truncated as f64 == value {
            return FloatForm::Integral(truncated);
        }
    }
    FloatForm::Fixed
}

trait Out {
    fn put(&mut self, bytes: &[u8]);
}

struct Counter(usize);

impl Out for Counter {
    fn put(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

/// Forwards the `[skip, skip + take)` byte range of whatever is rendered
/// into it to both the sink and the window.
struct Window<'w, 'b, S: ?Sized> {
    skip: usize,
    take: usize,
    sink: &'w mut S,
    out: &'w mut OutBuf<'b>,
}

impl<S: ByteSink + ?Sized> Out for Window<'_, '_, S> {
    fn put(&mut self, bytes: &[u8]) {
        let skipped = self.skip.min(bytes.len());
        self.skip -= skipped;
        for &byte in &bytes[skipped..] {
            if self.take == 0 {
                return;
            }
            self.take -= 1;
            self.out.push(byte);
            self.sink.write_byte(byte);
        }
    }
}

struct Fmt<'o, O: ?Sized>(&'o mut O);

impl<O: Out + ?Sized> fmt::Write for Fmt<'_, O> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use rstest::rstest;

    use super::*;

    fn render(fragment: Fragment<'_>) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut out = OutBuf::unbounded();
        fragment.write(0, usize::MAX, &mut |b: u8| bytes.push(b), &mut out);
        assert_eq!(bytes.len(), fragment.len());
        bytes
    }

    #[rstest]
    #[case(3.0, "3")]
    #[case(-3.0, "-3")]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    #[case(255.0, "255")]
    #[case(3.5, "3.500000")]
    #[case(-0.25, "-0.250000")]
    #[case(1e20, "100000000000000000000.000000")]
    #[case(f64::NAN, "null")]
    #[case(f64::INFINITY, "null")]
    fn floats_render_integral_or_fixed(#[case] value: f64, #[case] expected: &str) {
        let fragment = Fragment::Float {
            value,
            precision: 6,
        };
        assert_eq!(render(fragment), expected.as_bytes());
    }

    #[rstest]
    #[case(0, "3")]
    #[case(2, "2.70")]
    #[case(9, "2.700000000")]
    fn float_precision_is_configurable(#[case] precision: usize, #[case] expected: &str) {
        let rendered = render(Fragment::Float {
            value: 2.7,
            precision,
        });
        assert_eq!(rendered, expected.as_bytes());
    }

    #[rstest]
    #[case(Value::Null, "null")]
    #[case(Value::Bool(true), "true")]
    #[case(Value::Bool(false), "false")]
    #[case(Value::Integer(-42), "-42")]
    #[case(Value::Integer(i64::MAX), "9223372036854775807")]
    #[case(Value::String(BStr::new("red")), "\"red\"")]
    #[case(Value::Object(None), "{")]
    #[case(Value::Array(None), "[")]
    fn opening_fragments(#[case] value: Value<'static>, #[case] expected: &str) {
        assert_eq!(render(Fragment::opening(value, 6)), expected.as_bytes());
    }

    #[test]
    fn key_fragment() {
        assert_eq!(render(Fragment::Key(BStr::new("colors"))), b"\"colors\":");
        assert_eq!(Fragment::Key(BStr::new("")).len(), 3);
    }

    #[test]
    fn windowed_writes_cover_the_fragment_exactly() {
        let fragment = Fragment::Float {
            value: 12.5,
            precision: 6,
        };
        let whole = render(fragment);
        let mut pieces = Vec::new();
        let mut offset = 0;
        while offset < fragment.len() {
            let mut out = OutBuf::unbounded();
            fragment.write(offset, 3, &mut |b: u8| pieces.push(b), &mut out);
            offset += out.len();
        }
        assert_eq!(pieces, whole);
    }
}
