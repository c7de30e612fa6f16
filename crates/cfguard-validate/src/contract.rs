//! # Validator Contract
//!
//! The trait every validator implements, the failure type it returns, and
//! constructors for validators defined by the caller.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use cfguard_core::{RawValue, Value, ValueKind};
use thiserror::Error;

/// A validator's failure reason.
///
/// The reason is deterministic for a given input and is copied verbatim
/// into aggregated configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct Invalid {
    reason: Cow<'static, str>,
}

impl Invalid {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The human-readable reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Checks and coerces one raw configuration value.
///
/// Implementations must be deterministic and free of side effects. They are
/// shared between threads through [`SharedValidator`].
pub trait Validator: Send + Sync + fmt::Debug {
    /// Short name used in logs and schema introspection, e.g. `"int"`.
    fn name(&self) -> &str;

    /// Coerce `raw` into a typed value, or explain why it cannot be.
    ///
    /// # Errors
    ///
    /// Returns [`Invalid`] when the value is not acceptable.
    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid>;

    /// The kind every accepted value has, if fixed. `None` means the
    /// validator may produce values of more than one kind.
    fn kind(&self) -> Option<ValueKind> {
        None
    }
}

/// A validator shared between schemas and threads.
pub type SharedValidator = Arc<dyn Validator>;

type CoerceFn = dyn Fn(&RawValue) -> Result<Value, Invalid> + Send + Sync;
type CheckFn = dyn Fn(&str) -> bool + Send + Sync;

/// Validator backed by a caller-supplied coercion closure.
pub struct FnValidator {
    name: String,
    coerce: Box<CoerceFn>,
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Validator for FnValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        (self.coerce)(raw)
    }
}

/// Validator that passes text through unchanged when a predicate holds.
pub struct PredicateValidator {
    name: String,
    check: Box<CheckFn>,
    reason: Cow<'static, str>,
}

impl fmt::Debug for PredicateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("name", &self.name)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl Validator for PredicateValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        match raw.as_text() {
            Some(text) if (self.check)(text) => Ok(Value::Str(text.to_string())),
            _ => Err(Invalid::new(self.reason.clone())),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

/// Validator accepting one of an enumerated set of strings.
#[derive(Debug, Clone)]
pub struct OneOfValidator {
    name: String,
    choices: Vec<String>,
}

impl OneOfValidator {
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Validator for OneOfValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        match raw.as_text() {
            Some(text) if self.choices.iter().any(|c| c == text) => Ok(Value::Str(text.to_string())),
            _ => Err(Invalid::new(format!(
                "expected one of: {}",
                self.choices.join(", ")
            ))),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

/// Build a validator from a coercion closure.
///
/// ```
/// use cfguard_core::{RawValue, Value, ValueKind};
/// use cfguard_validate::{from_fn, Invalid, Validator};
///
/// let port = from_fn("port", |raw| match raw.as_text().map(str::parse::<u16>) {
///     Some(Ok(p)) if p != 0 => Ok(Value::Int(i64::from(p))),
///     _ => Err(Invalid::new("not a port number")),
/// });
/// assert_eq!(port.validate(&RawValue::from("8080")), Ok(Value::Int(8080)));
/// ```
pub fn from_fn<F>(name: impl Into<String>, coerce: F) -> SharedValidator
where
    F: Fn(&RawValue) -> Result<Value, Invalid> + Send + Sync + 'static,
{
    Arc::new(FnValidator {
        name: name.into(),
        coerce: Box::new(coerce),
    })
}

/// Build a string predicate validator.
///
/// Text for which `check` returns true passes through unchanged; anything
/// else, including non-text raw values, fails with `reason`.
pub fn predicate<F>(
    name: impl Into<String>,
    check: F,
    reason: impl Into<Cow<'static, str>>,
) -> SharedValidator
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateValidator {
        name: name.into(),
        check: Box::new(check),
        reason: reason.into(),
    })
}

/// Build a validator that accepts exactly one of `choices` (case-sensitive).
pub fn one_of<I, S>(name: impl Into<String>, choices: I) -> SharedValidator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(OneOfValidator {
        name: name.into(),
        choices: choices.into_iter().map(Into::into).collect(),
    })
}
