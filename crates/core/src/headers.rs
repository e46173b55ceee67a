//! Header normalization for Splash replies.
//!
//! Splash reports headers in one of two shapes depending on which of its code
//! paths produced them:
//!
//! - a HAR-style list of `{"name": ..., "value": ...}` objects, duplicates allowed
//! - a map from header name to a list of string values
//!
//! Both are captured by [`RawHeaders`] at the JSON boundary and folded into
//! [`CanonicalHeaders`] by [`normalize`]. Nothing past the decoder sees the raw shape.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Headers exactly as Splash sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawHeaders {
    /// HAR-style ordered pairs. Entries lacking a string name or value are
    /// already dropped here.
    List(Vec<(String, String)>),

    /// Name to values, in document order.
    Map(Vec<(String, Vec<String>)>),

    /// Anything else (absent, null, scalar). Normalizes to no headers.
    #[default]
    Other,
}

impl<'de> Deserialize<'de> for RawHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(entries) => {
                let pairs = entries
                    .into_iter()
                    .filter_map(|entry| {
                        let name = entry.get("name")?.as_str()?;
                        let value = entry.get("value")?.as_str()?;
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect();
                Ok(RawHeaders::List(pairs))
            }
            Value::Object(map) => {
                let mut out = Vec::with_capacity(map.len());
                for (name, values) in map {
                    let Value::Array(values) = values else {
                        return Err(de::Error::custom(format!("header {name:?}: expected a list of strings")));
                    };
                    let values = values
                        .into_iter()
                        .map(|v| match v {
                            Value::String(s) => Ok(s),
                            other => Err(de::Error::custom(format!("header {name:?}: non-string value {other}"))),
                        })
                        .collect::<Result<Vec<_>, D::Error>>()?;
                    out.push((name, values));
                }
                Ok(RawHeaders::Map(out))
            }
            _ => Ok(RawHeaders::Other),
        }
    }
}

/// Fold either raw shape into canonical multi-valued headers.
///
/// Names keep the case Splash supplied. Values accumulate under their name in
/// order of appearance.
pub fn normalize(raw: RawHeaders) -> CanonicalHeaders {
    let mut headers = CanonicalHeaders::default();
    match raw {
        RawHeaders::List(pairs) => {
            for (name, value) in pairs {
                headers.append(name, value);
            }
        }
        RawHeaders::Map(entries) => {
            for (name, values) in entries {
                for value in values {
                    headers.append(name.clone(), value);
                }
            }
        }
        RawHeaders::Other => {}
    }
    headers
}

/// Ordered, multi-valued header mapping.
///
/// Lookups by name are ASCII case-insensitive and combine entries whose names
/// differ only in case; storage keeps each spelling separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl CanonicalHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`, creating the entry on first use.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// All values for `name`, in order.
    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
    }

    /// All values for `name` joined with `", "`, the list form of a field.
    pub fn get_joined(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self.get_all(name).collect();
        if values.is_empty() { None } else { Some(values.join(", ")) }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(name, values)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for CanonicalHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawHeaders::deserialize(deserializer).map(normalize)
    }
}

/// Serialized in the map shape, which round-trips through [`normalize`].
impl Serialize for CanonicalHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(n, v)| (n, v)))
    }
}
