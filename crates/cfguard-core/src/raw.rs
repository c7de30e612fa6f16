//! # Raw Configuration
//!
//! The input side of the engine. Collaborators (environment readers, file
//! loaders, test fixtures) produce a [`RawConfig`]; the engine reads it and
//! never mutates it.
//!
//! Raw values are loosely typed: usually text, sometimes a scalar that an
//! earlier layer already parsed. [`RawValue::Null`] is the explicit
//! "not set" marker and is treated exactly like a missing entry.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Longest rendering of a raw value kept in failure records.
const RENDER_LIMIT: usize = 64;

/// A raw configuration value as received from a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Explicit "not set" marker.
    Null,
    /// An already-typed boolean.
    Bool(bool),
    /// An already-typed integer.
    Int(i64),
    /// An already-typed float.
    Float(f64),
    /// Text, the common case for environment-sourced values.
    Str(String),
}

impl RawValue {
    /// Returns true for the "not set" marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Str(s) if s.trim().is_empty())
    }

    /// Returns the text of a `Str` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short, printable rendering for error reports.
    ///
    /// Text is cut to a fixed number of characters and then escaped. A
    /// failure record never carries raw control characters, and an escape
    /// is never split by the cut.
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => {
                let head: String = s
                    .chars()
                    .take(RENDER_LIMIT)
                    .flat_map(char::escape_debug)
                    .collect();
                if s.chars().nth(RENDER_LIMIT).is_some() {
                    format!("\"{head}...\"")
                } else {
                    format!("\"{head}\"")
                }
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Bool(b) => Self::Bool(b),
            Value::Int(i) => Self::Int(i),
            Value::Float(x) => Self::Float(x),
            Value::Str(s) => Self::Str(s),
        }
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

/// A flat mapping from configuration key to raw value.
///
/// Keys are kept sorted so iteration, and therefore any per-key reporting
/// derived from it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig {
    entries: BTreeMap<String, RawValue>,
}

impl RawConfig {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, RawValue> {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for RawConfig
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RawConfig {
    type Item = (&'a String, &'a RawValue);
    type IntoIter = btree_map::Iter<'a, String, RawValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
