//! # Schema Model
//!
//! A [`Schema`] is an ordered list of `(key, FieldSpec)` pairs. Every shape a
//! caller can declare (a bare validator, a registry tag, a full spec) is
//! lifted into one [`FieldSpec`] at construction time, so the engine only
//! ever walks one uniform shape.
//!
//! Construction is infallible. [`Schema::check`] finds malformed schemas
//! (duplicate keys, required-with-default, defaults the field itself would
//! reject, ...) and the engine runs it before looking at any raw value.

use std::collections::HashMap;
use std::fmt;

use cfguard_core::{RawValue, Value, ValueKind};
use cfguard_validate::{SharedValidator, ValidatorRegistry};

use crate::error::{SchemaError, NOT_FINITE};

/// Inclusive limits applied after a validator accepts a value.
///
/// Either side may be open. Integer and float bounds compare numerically
/// (an integer value is widened for float bounds); length bounds count the
/// characters of a string value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bounds {
    /// Limits for integer values.
    Int {
        /// Smallest accepted value.
        min: Option<i64>,
        /// Largest accepted value.
        max: Option<i64>,
    },
    /// Limits for numeric values compared as floats.
    Float {
        /// Smallest accepted value.
        min: Option<f64>,
        /// Largest accepted value.
        max: Option<f64>,
    },
    /// Limits on string length, in characters.
    Length {
        /// Shortest accepted length.
        min: Option<usize>,
        /// Longest accepted length.
        max: Option<usize>,
    },
}

impl Bounds {
    /// Closed integer range `[min, max]`.
    pub fn int_range(min: i64, max: i64) -> Self {
        Self::Int {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Closed float range `[min, max]`.
    pub fn float_range(min: f64, max: f64) -> Self {
        Self::Float {
            min: Some(min),
            max: Some(max),
        }
    }

    /// String length between `min` and `max` characters.
    pub fn length(min: usize, max: usize) -> Self {
        Self::Length {
            min: Some(min),
            max: Some(max),
        }
    }

    fn family(&self) -> &'static str {
        match self {
            Self::Int { .. } | Self::Float { .. } => "numeric",
            Self::Length { .. } => "length",
        }
    }

    /// True if values of `kind` can be checked against these bounds.
    pub fn applies_to(&self, kind: ValueKind) -> bool {
        match self {
            Self::Int { .. } | Self::Float { .. } => {
                matches!(kind, ValueKind::Int | ValueKind::Float)
            }
            Self::Length { .. } => kind == ValueKind::Str,
        }
    }

    /// Explain why these bounds cannot be satisfied by anything, if so.
    fn malformed(&self) -> Option<String> {
        match self {
            Self::Int {
                min: Some(lo),
                max: Some(hi),
            } if lo > hi => Some(format!("minimum {lo} exceeds maximum {hi}")),
            Self::Float { min, max } => {
                if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
                    Some("NaN is not a valid bound".to_string())
                } else {
                    match (min, max) {
                        (Some(lo), Some(hi)) if lo > hi => {
                            Some(format!("minimum {lo} exceeds maximum {hi}"))
                        }
                        _ => None,
                    }
                }
            }
            Self::Length {
                min: Some(lo),
                max: Some(hi),
            } if lo > hi => Some(format!("minimum length {lo} exceeds maximum length {hi}")),
            _ => None,
        }
    }

    /// Check a coerced value, returning the failure reason if out of bounds.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Self::Int { min, max }, Value::Int(v)) => check_order(*v, *min, *max, "value"),
            (Self::Int { min, max }, Value::Float(v)) => check_order(
                *v,
                min.map(|m| m as f64),
                max.map(|m| m as f64),
                "value",
            ),
            (Self::Float { min, max }, Value::Float(v)) => check_order(*v, *min, *max, "value"),
            (Self::Float { min, max }, Value::Int(v)) => {
                check_order(*v as f64, *min, *max, "value")
            }
            (Self::Length { min, max }, Value::Str(s)) => {
                check_order(s.chars().count(), *min, *max, "length")
            }
            (bounds, other) => Err(format!(
                "{} bounds do not apply to {} values",
                bounds.family(),
                other.kind()
            )),
        }
    }
}

fn check_order<T>(v: T, min: Option<T>, max: Option<T>, what: &str) -> Result<(), String>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if let Some(lo) = min {
        if v < lo {
            return Err(format!("{what} {v} below minimum {lo}"));
        }
    }
    if let Some(hi) = max {
        if v > hi {
            return Err(format!("{what} {v} above maximum {hi}"));
        }
    }
    Ok(())
}

/// Per-key policy: how to validate, whether a value is required, what to
/// use when none is given.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    validator: SharedValidator,
    required: bool,
    default: Option<Value>,
    aliases: Vec<String>,
    bounds: Option<Bounds>,
    description: Option<String>,
}

impl FieldSpec {
    /// A required field with no default.
    pub fn new(validator: SharedValidator) -> Self {
        Self {
            validator,
            required: true,
            default: None,
            aliases: Vec::new(),
            bounds: None,
            description: None,
        }
    }

    /// Mark the field optional. An optional field with no value and no
    /// default resolves to "not set".
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark the field required.
    ///
    /// Calling this after [`with_default`](Self::with_default) produces a
    /// field that [`Schema::check`] rejects.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Use `value` when the key is absent. Makes the field optional.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Accept `alias` as an alternative raw key for this field.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validator(&self) -> &SharedValidator {
        &self.validator
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run the validator, then the bounds.
    pub(crate) fn accept(&self, raw: &RawValue) -> Result<Value, String> {
        let value = self
            .validator
            .validate(raw)
            .map_err(|invalid| invalid.reason().to_string())?;
        if matches!(value, Value::Float(x) if !x.is_finite()) {
            return Err(NOT_FINITE.to_string());
        }
        if let Some(bounds) = &self.bounds {
            bounds.check(&value)?;
        }
        Ok(value)
    }
}

impl From<SharedValidator> for FieldSpec {
    fn from(validator: SharedValidator) -> Self {
        Self::new(validator)
    }
}

/// An ordered mapping from configuration key to [`FieldSpec`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// An empty schema.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    /// The first field declared under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// Check the schema for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, checking fields in
    /// declaration order.
    pub fn check(&self) -> Result<(), SchemaError> {
        self.resolve_defaults().map(|_| ())
    }

    /// Check the schema and coerce every declared default through its own
    /// field. The result is aligned with the field list.
    pub(crate) fn resolve_defaults(&self) -> Result<Vec<Option<Value>>, SchemaError> {
        // name (key or alias) -> owning key
        let mut names: HashMap<&str, &str> = HashMap::with_capacity(self.fields.len());
        for (index, (key, _)) in self.fields.iter().enumerate() {
            if key.trim().is_empty() {
                return Err(SchemaError::EmptyKey { index });
            }
            if names.insert(key.as_str(), key.as_str()).is_some() {
                return Err(SchemaError::DuplicateKey { key: key.clone() });
            }
        }

        let mut defaults = Vec::with_capacity(self.fields.len());
        for (key, spec) in &self.fields {
            for alias in &spec.aliases {
                if alias.trim().is_empty() {
                    return Err(SchemaError::EmptyAlias { key: key.clone() });
                }
                if let Some(existing) = names.insert(alias.as_str(), key.as_str()) {
                    return Err(SchemaError::AliasConflict {
                        alias: alias.clone(),
                        key: key.clone(),
                        existing: existing.to_string(),
                    });
                }
            }

            if let Some(bounds) = &spec.bounds {
                if let Some(reason) = bounds.malformed() {
                    return Err(SchemaError::InvalidBounds {
                        key: key.clone(),
                        reason,
                    });
                }
                if let Some(kind) = spec.validator.kind() {
                    if !bounds.applies_to(kind) {
                        return Err(SchemaError::InvalidBounds {
                            key: key.clone(),
                            reason: format!(
                                "{} bounds do not apply to {kind} fields",
                                bounds.family()
                            ),
                        });
                    }
                }
            }

            let resolved = match &spec.default {
                None => None,
                Some(_) if spec.required => {
                    return Err(SchemaError::RequiredWithDefault { key: key.clone() });
                }
                Some(default) => {
                    let coerced = spec
                        .accept(&RawValue::from(default.clone()))
                        .map_err(|reason| SchemaError::InvalidDefault {
                            key: key.clone(),
                            reason,
                        })?;
                    Some(coerced)
                }
            };
            defaults.push(resolved);
        }
        Ok(defaults)
    }

    /// `(alias, key)` pairs for every declared alias.
    pub(crate) fn alias_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|(key, spec)| spec.aliases.iter().map(move |a| (a.clone(), key.clone())))
            .collect()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldSpec)>,
}

impl SchemaBuilder {
    /// Declare a field. Accepts a full [`FieldSpec`] or a bare validator,
    /// which becomes a required field without a default.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.fields.push((key.into(), spec.into()));
        self
    }

    /// Declare a required field by registry tag.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownTypeTag` if `tag` is not registered.
    pub fn field_tag(
        self,
        key: impl Into<String>,
        tag: &str,
        registry: &ValidatorRegistry,
    ) -> Result<Self, SchemaError> {
        let key = key.into();
        match registry.resolve(tag) {
            Some(validator) => Ok(self.field(key, validator)),
            None => Err(SchemaError::UnknownTypeTag {
                key,
                tag: tag.to_string(),
            }),
        }
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}
