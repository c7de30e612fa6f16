//! # Error Types
//!
//! One type per failure kind, following the shape of the rest of the
//! workspace: `thiserror` enums with structured fields, and an umbrella
//! [`GuardError`] for callers that want a single error type.
//!
//! - [`SchemaError`]: the schema itself is malformed. Raised before any raw
//!   value is looked at.
//! - [`ConfigError`]: one or more keys failed. Carries every failure in
//!   schema order, never zero.
//! - [`LookupError`]: a read on a built configuration could not be served.
//! - [`AccessError`]: someone tried to write to a built configuration.

use std::fmt;

use cfguard_core::{RawValue, ValueKind};
use thiserror::Error;

/// Reason recorded for a required key with no value and no default.
pub const MISSING_REQUIRED: &str = "missing required configuration";

/// Reason recorded for a float that is NaN or infinite.
pub const NOT_FINITE: &str = "not a finite number";

/// Reason recorded, in strict mode, for a raw key no field declares.
pub const UNDECLARED_KEY: &str = "undeclared configuration key";

/// The schema is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field key is empty or whitespace.
    #[error("schema field #{index} has an empty key")]
    EmptyKey {
        /// Position of the field in declaration order.
        index: usize,
    },

    /// Two fields share a key.
    #[error("duplicate schema key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// A field declares an empty alias.
    #[error("field '{key}' declares an empty alias")]
    EmptyAlias {
        /// The field declaring the alias.
        key: String,
    },

    /// An alias collides with a key or with another alias.
    #[error("alias '{alias}' of field '{key}' collides with '{existing}'")]
    AliasConflict {
        /// The colliding alias.
        alias: String,
        /// The field declaring it.
        key: String,
        /// The key whose name or alias is already `alias`.
        existing: String,
    },

    /// A field is both required and defaulted.
    #[error("field '{key}' is required but also declares a default")]
    RequiredWithDefault {
        /// The conflicting field.
        key: String,
    },

    /// A declared default does not pass the field's own validator or bounds.
    #[error("default for field '{key}' is invalid: {reason}")]
    InvalidDefault {
        /// The field.
        key: String,
        /// Why the default was rejected.
        reason: String,
    },

    /// Bounds are inverted or not expressible.
    #[error("bounds for field '{key}' are invalid: {reason}")]
    InvalidBounds {
        /// The field.
        key: String,
        /// What is wrong with them.
        reason: String,
    },

    /// A type tag did not resolve in the validator registry.
    #[error("field '{key}' names unknown type '{tag}'")]
    UnknownTypeTag {
        /// The field.
        key: String,
        /// The unresolved tag.
        tag: String,
    },

    /// A declarative schema document could not be parsed.
    #[error("schema declaration could not be parsed: {reason}")]
    Declaration {
        /// Parser message.
        reason: String,
    },
}

/// A single key that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// The key as declared in the schema (or the raw key, for undeclared keys).
    pub key: String,
    /// Human-readable reason, verbatim from the validator where one ran.
    pub reason: String,
    /// Printable rendering of the offending raw value; `None` when the key
    /// had no value at all.
    pub raw: Option<String>,
}

impl FieldFailure {
    pub(crate) fn missing(key: &str) -> Self {
        Self {
            key: key.to_string(),
            reason: MISSING_REQUIRED.to_string(),
            raw: None,
        }
    }

    pub(crate) fn rejected(key: &str, reason: impl Into<String>, raw: &RawValue) -> Self {
        Self {
            key: key.to_string(),
            reason: reason.into(),
            raw: Some(raw.render()),
        }
    }

    pub(crate) fn undeclared(key: &str, raw: &RawValue) -> Self {
        Self::rejected(key, UNDECLARED_KEY, raw)
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)?;
        if let Some(raw) = &self.raw {
            write!(f, " (got {raw})")?;
        }
        Ok(())
    }
}

/// Every failure from one validation pass.
///
/// Holds at least one [`FieldFailure`]. Failures for declared keys come in
/// schema declaration order; in strict mode, undeclared keys follow in raw
/// key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    failures: Vec<FieldFailure>,
}

impl ConfigError {
    /// Wrap a failure list. Returns `None` for an empty list, since an
    /// error without failures is not an error.
    pub(crate) fn from_failures(failures: Vec<FieldFailure>) -> Option<Self> {
        (!failures.is_empty()).then_some(Self { failures })
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    /// Number of failures; always at least one.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failing keys in report order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.key.as_str())
    }

    /// The failure recorded for `key`, if any.
    pub fn failure_for(&self, key: &str) -> Option<&FieldFailure> {
        self.failures.iter().find(|f| f.key == key)
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration invalid ({} error", self.failures.len())?;
        if self.failures.len() != 1 {
            f.write_str("s")?;
        }
        f.write_str("):")?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

/// A read on a built configuration could not be served.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The key was not declared by the schema the configuration was built from.
    #[error("configuration key '{key}' is not declared")]
    Undeclared {
        /// The requested key.
        key: String,
    },

    /// The key is declared optional and has no value.
    #[error("configuration key '{key}' is not set")]
    NotSet {
        /// The requested key.
        key: String,
    },

    /// A typed accessor was used on a value of another type.
    #[error("configuration key '{key}' holds {found}, not {expected}")]
    TypeMismatch {
        /// The requested key.
        key: String,
        /// Type the accessor returns.
        expected: ValueKind,
        /// Type actually stored.
        found: ValueKind,
    },
}

/// A write was attempted on a built configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("configuration is immutable: cannot assign '{key}'")]
pub struct AccessError {
    /// The key the caller tried to assign.
    pub key: String,
}

/// Failure of [`crate::Engine::build`].
#[derive(Error, Debug)]
pub enum BuildError {
    /// The schema is malformed; no raw value was inspected.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// One or more keys failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    /// The aggregated validation error, if that is what this is.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(err) => Some(err),
            Self::Schema(_) => None,
        }
    }

    /// The schema error, if that is what this is.
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

/// Umbrella error for callers that handle every kind in one place.
#[derive(Error, Debug)]
pub enum GuardError {
    /// See [`SchemaError`].
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// See [`ConfigError`].
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// See [`LookupError`].
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// See [`AccessError`].
    #[error("access error: {0}")]
    Access(#[from] AccessError),
}

impl From<BuildError> for GuardError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Schema(e) => Self::Schema(e),
            BuildError::Config(e) => Self::Config(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigError {
        ConfigError::from_failures(vec![
            FieldFailure::rejected("A", "not an integer", &RawValue::from("notanum")),
            FieldFailure::missing("B"),
        ])
        .expect("non-empty")
    }

    #[test]
    fn test_empty_failure_list_is_not_an_error() {
        assert!(ConfigError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn test_config_error_display_lists_every_failure() {
        let err = sample();
        let text = err.to_string();
        assert!(text.starts_with("configuration invalid (2 errors):"));
        assert!(text.contains("\n  A: not an integer (got \"notanum\")"));
        assert!(text.contains("\n  B: missing required configuration"));
    }

    #[test]
    fn test_config_error_singular() {
        let err = ConfigError::from_failures(vec![FieldFailure::missing("X")]).unwrap();
        assert!(err.to_string().starts_with("configuration invalid (1 error):"));
        assert!(!err.is_empty());
    }

    #[test]
    fn test_config_error_accessors() {
        let err = sample();
        assert_eq!(err.len(), 2);
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(err.failure_for("B").map(|f| f.raw.clone()), Some(None));
        assert!(err.failure_for("C").is_none());
    }

    #[test]
    fn test_lookup_error_messages() {
        let err = LookupError::TypeMismatch {
            key: "PORT".to_string(),
            expected: ValueKind::Bool,
            found: ValueKind::Int,
        };
        assert_eq!(err.to_string(), "configuration key 'PORT' holds int, not bool");
    }

    #[test]
    fn test_guard_error_from_build_error() {
        let build = BuildError::from(SchemaError::DuplicateKey { key: "A".to_string() });
        assert!(build.as_schema().is_some());
        assert!(build.as_config().is_none());
        let guard = GuardError::from(build);
        assert!(matches!(guard, GuardError::Schema(SchemaError::DuplicateKey { .. })));
    }
}
