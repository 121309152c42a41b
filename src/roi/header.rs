//! Decoded header values, keyed by field name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One decoded header field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(#[serde(with = "float_repr")] f32),
    Bytes(Vec<u8>),
}

impl HeaderValue {
    /// Integer view. Floats are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            HeaderValue::Float(v) => Some(*v as i64),
            HeaderValue::Bytes(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            HeaderValue::Int(v) => Some(*v as f32),
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Bytes(_) => None,
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<i32> for HeaderValue {
    fn from(v: i32) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<f32> for HeaderValue {
    fn from(v: f32) -> Self {
        HeaderValue::Float(v)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Int(v) => write!(f, "{}", v),
            HeaderValue::Float(v) => write!(f, "{}", v),
            HeaderValue::Bytes(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Serde helpers for `f32` values that may be NaN or infinite.
///
/// JSON has no literal for these, so they travel as the strings `"NaN"`,
/// `"inf"` and `"-inf"`. Finite values stay plain numbers.
pub(crate) mod float_repr {
    use serde::de::{self, Deserializer, Unexpected};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f32::NAN),
                "inf" => Ok(f32::INFINITY),
                "-inf" => Ok(f32::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"NaN\", \"inf\" or \"-inf\"",
                )),
            },
        }
    }
}

/// Field name → value mapping, as read from (or to be written to) a record.
///
/// Values the codec does not interpret are passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap(BTreeMap<String, HeaderValue>);

impl HeaderMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.0.get(name)
    }

    /// Integer value of `name`, if present and numeric.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(HeaderValue::as_i64)
    }

    /// Float value of `name`, if present and numeric.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(HeaderValue::as_f32)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{:<22} {}", name, value)?;
        }
        Ok(())
    }
}
