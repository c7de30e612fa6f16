//! # Built Configuration
//!
//! [`ConfigGuard`] is the product of a successful build: one entry per
//! schema field, in schema order, each either a coerced [`Value`] or "not
//! set". It has no mutating API at all. [`ConfigGuard::set`] exists only so
//! that an attempted write has a defined, reportable outcome.
//!
//! A guard is `Send + Sync` and can be shared across threads behind an
//! `Arc` without locking.

use std::collections::HashMap;
use std::slice;

use cfguard_core::{fingerprint_entries, ContentDigest, Value, ValueKind};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{AccessError, LookupError};

/// An immutable, validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigGuard {
    entries: Vec<(String, Option<Value>)>,
    /// Declared keys and aliases, each mapped to its entry.
    index: HashMap<String, usize>,
    fingerprint: Option<ContentDigest>,
}

impl ConfigGuard {
    /// Freeze resolved entries. Aliases naming an unknown key are dropped.
    pub(crate) fn new(entries: Vec<(String, Option<Value>)>, aliases: Vec<(String, String)>) -> Self {
        let fingerprint = match fingerprint_entries(
            entries.iter().map(|(k, v)| (k.as_str(), v.as_ref())),
        ) {
            Ok(digest) => Some(digest),
            Err(err) => {
                tracing::error!(error = %err, "configuration has no canonical form");
                None
            }
        };
        let mut index: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
        for (alias, key) in aliases {
            if let Some(&i) = index.get(&key) {
                index.insert(alias, i);
            }
        }
        Self {
            entries,
            index,
            fingerprint,
        }
    }

    fn entry(&self, key: &str) -> Result<&(String, Option<Value>), LookupError> {
        self.index
            .get(key)
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| LookupError::Undeclared {
                key: key.to_string(),
            })
    }

    /// The value for a declared key (or one of its aliases); `Ok(None)` if
    /// the key is optional and unset.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Undeclared` if no schema field claims `key`.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, LookupError> {
        self.entry(key).map(|(_, v)| v.as_ref())
    }

    /// Like [`get`](Self::get), but an unset key is an error.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Undeclared` or `LookupError::NotSet`.
    pub fn require(&self, key: &str) -> Result<&Value, LookupError> {
        let (declared, value) = self.entry(key)?;
        value.as_ref().ok_or_else(|| LookupError::NotSet {
            key: declared.clone(),
        })
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: ValueKind,
        pick: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, LookupError> {
        let declared = &self.entry(key)?.0;
        let value = self.require(key)?;
        pick(value).ok_or_else(|| LookupError::TypeMismatch {
            key: declared.clone(),
            expected,
            found: value.kind(),
        })
    }

    /// # Errors
    ///
    /// Fails as [`require`](Self::require) does, or with
    /// `LookupError::TypeMismatch` if the value is not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, LookupError> {
        self.typed(key, ValueKind::Bool, Value::as_bool)
    }

    /// # Errors
    ///
    /// Fails as [`require`](Self::require) does, or with
    /// `LookupError::TypeMismatch` if the value is not an integer.
    pub fn get_int(&self, key: &str) -> Result<i64, LookupError> {
        self.typed(key, ValueKind::Int, Value::as_int)
    }

    /// # Errors
    ///
    /// Fails as [`require`](Self::require) does, or with
    /// `LookupError::TypeMismatch` if the value is not a float.
    pub fn get_float(&self, key: &str) -> Result<f64, LookupError> {
        self.typed(key, ValueKind::Float, Value::as_float)
    }

    /// # Errors
    ///
    /// Fails as [`require`](Self::require) does, or with
    /// `LookupError::TypeMismatch` if the value is not a string.
    pub fn get_str(&self, key: &str) -> Result<&str, LookupError> {
        self.typed(key, ValueKind::Str, Value::as_str)
    }

    /// Assignment is never permitted. The stored value is left untouched.
    ///
    /// # Errors
    ///
    /// Always returns [`AccessError`].
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let value = value.into();
        tracing::warn!(key = %key, kind = %value.kind(), "rejected write to immutable configuration");
        Err(AccessError {
            key: key.to_string(),
        })
    }

    /// True if `key` is a declared key or alias.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared keys in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in schema order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// SHA-256 over the canonical JSON of the resolved entries.
    ///
    /// `None` only if an entry holds a NaN or infinite float, which a build
    /// never stores.
    pub fn fingerprint(&self) -> Option<&ContentDigest> {
        self.fingerprint.as_ref()
    }
}

impl PartialEq for ConfigGuard {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.index == other.index
    }
}

/// Iterator over `(key, value)` pairs of a [`ConfigGuard`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (String, Option<Value>)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a Value>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ConfigGuard {
    type Item = (&'a str, Option<&'a Value>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Serializes as a map in schema order; unset keys become `null`.
impl Serialize for ConfigGuard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
