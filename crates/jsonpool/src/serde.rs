//! A [`serde::Serialize`] view of pool trees.
//!
//! The view renders the same values [`Pool::emit`] writes: integral floats
//! become integers and non-finite floats become `null`. A streaming array
//! shows only the batch it currently holds.

use bstr::BStr;
use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

use crate::{
    emit::{FloatForm, classify},
    node::{NodeId, Value},
    pool::Pool,
};

impl<'a, 'p> Pool<'a, 'p> {
    /// A serializable view of the value at `root` and its descendants.
    ///
    /// Object members without a key serialize under `""`.
    #[must_use]
    pub fn tree(&self, root: NodeId) -> Tree<'_, 'a, 'p> {
        Tree { pool: self, id: root }
    }
}

/// Returned by [`Pool::tree`].
#[derive(Debug, Clone, Copy)]
pub struct Tree<'t, 'a, 'p> {
    pool: &'t Pool<'a, 'p>,
    id: NodeId,
}

impl Serialize for Tree<'_, '_, '_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.pool.value(self.id) {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(value),
            Value::Integer(value) => serializer.serialize_i64(value),
            Value::Float(value) => match classify(value) {
                FloatForm::NotFinite => serializer.serialize_unit(),
                FloatForm::Integral(value) => serializer.serialize_i64(value),
                FloatForm::Fixed => serializer.serialize_f64(value),
            },
            Value::String(value) => Text(value).serialize(serializer),
            Value::Array(_) => {
                let mut seq = serializer.serialize_seq(None)?;
                for child in self.pool.children(self.id) {
                    seq.serialize_element(&self.pool.tree(child))?;
                }
                seq.end()
            }
            Value::Object(_) => {
                let mut map = serializer.serialize_map(None)?;
                for child in self.pool.children(self.id) {
                    let key = Text(self.pool.key(child).unwrap_or(BStr::new("")));
                    map.serialize_entry(&key, &self.pool.tree(child))?;
                }
                map.end()
            }
        }
    }
}

/// Byte strings serialize as text, lossily when they are not UTF-8.
struct Text<'a>(&'a BStr);

impl Serialize for Text<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match core::str::from_utf8(self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_str(self.0),
        }
    }
}
