//! # Validation Engine
//!
//! Runs one raw mapping against one schema and either freezes the result
//! into a [`ConfigGuard`] or reports every failing key at once.
//!
//! The pass is a pure function of `(raw, schema, options)`: no I/O, no
//! shared state, nothing retained between calls. An `Engine` can be used
//! from many threads at the same time.
//!
//! ## Algorithm
//!
//! 1. Check the schema and coerce its defaults. A malformed schema fails
//!    here with [`SchemaError`](crate::SchemaError), before any raw value is
//!    read.
//! 2. For each field, in declaration order, take the first of its key and
//!    aliases that holds a presented value. `Null` is never presented; blank
//!    text is presented only under [`EmptyValuePolicy::Present`].
//! 3. No presented value: use the default, else leave the key unset if it is
//!    optional, else record "missing required configuration".
//! 4. A presented value goes through the validator, then the bounds. The
//!    first rejection is recorded with its reason and the rendered raw value.
//! 5. Under [`UnknownKeyPolicy::Strict`], every raw key no field claims is
//!    recorded after the field failures.
//! 6. Any failures become one [`ConfigError`]; otherwise the entries are
//!    frozen into a [`ConfigGuard`].

use std::collections::HashSet;

use cfguard_core::{RawConfig, RawValue, Value};

use crate::error::{BuildError, ConfigError, FieldFailure};
use crate::guard::ConfigGuard;
use crate::options::{BuildOptions, EmptyValuePolicy, UnknownKeyPolicy};
use crate::schema::{FieldSpec, Schema};

/// Validates raw configuration against schemas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    options: BuildOptions,
}

impl Engine {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Validate `raw` against `schema`.
    ///
    /// # Errors
    ///
    /// - `BuildError::Schema` if the schema is malformed. Raw values are not
    ///   inspected in that case.
    /// - `BuildError::Config` with every failing key otherwise.
    pub fn build(&self, raw: &RawConfig, schema: &Schema) -> Result<ConfigGuard, BuildError> {
        let defaults = schema.resolve_defaults()?;

        tracing::debug!(
            fields = schema.len(),
            raw_keys = raw.len(),
            unknown_keys = ?self.options.unknown_keys,
            "validating configuration"
        );

        let mut failures = Vec::new();
        let mut entries = Vec::with_capacity(schema.len());
        let mut claimed: HashSet<&str> = HashSet::new();

        for ((key, spec), default) in schema.iter().zip(defaults) {
            claimed.insert(key);
            claimed.extend(spec.aliases().iter().map(String::as_str));

            match self.presented(raw, key, spec) {
                None => match default {
                    Some(value) => entries.push((key.to_string(), Some(value))),
                    None if !spec.is_required() => entries.push((key.to_string(), None)),
                    None => failures.push(FieldFailure::missing(key)),
                },
                Some(value) => match spec.accept(value) {
                    Ok(coerced) => entries.push((key.to_string(), Some(coerced))),
                    Err(reason) => failures.push(FieldFailure::rejected(key, reason, value)),
                },
            }
        }

        for (key, value) in raw {
            if claimed.contains(key.as_str()) {
                continue;
            }
            match self.options.unknown_keys {
                UnknownKeyPolicy::Strict => failures.push(FieldFailure::undeclared(key, value)),
                UnknownKeyPolicy::Lenient => {
                    tracing::debug!(key = %key, "ignoring undeclared configuration key");
                }
            }
        }

        if let Some(err) = ConfigError::from_failures(failures) {
            let keys: Vec<&str> = err.keys().collect();
            tracing::warn!(
                failures = err.len(),
                keys = %keys.join(", "),
                "configuration rejected"
            );
            return Err(err.into());
        }

        let guard = ConfigGuard::new(entries, schema.alias_pairs());
        if let Some(fingerprint) = guard.fingerprint() {
            tracing::info!(keys = guard.len(), fingerprint = %fingerprint, "configuration built");
        }
        Ok(guard)
    }

    /// The first presented raw value among the field's key and aliases.
    fn presented<'r>(&self, raw: &'r RawConfig, key: &str, spec: &FieldSpec) -> Option<&'r RawValue> {
        std::iter::once(key)
            .chain(spec.aliases().iter().map(String::as_str))
            .filter_map(|name| raw.get(name))
            .find(|value| !self.is_absent(value))
    }

    fn is_absent(&self, value: &RawValue) -> bool {
        value.is_null()
            || (self.options.empty_values == EmptyValuePolicy::Absent && value.is_blank())
    }
}

/// Validate with default options.
///
/// # Errors
///
/// See [`Engine::build`].
pub fn build(raw: &RawConfig, schema: &Schema) -> Result<ConfigGuard, BuildError> {
    Engine::default().build(raw, schema)
}

/// Validate and return the typed values as a plain owned list, in schema
/// order. Unset optional keys are omitted.
///
/// # Errors
///
/// See [`Engine::build`].
pub fn resolve(raw: &RawConfig, schema: &Schema) -> Result<Vec<(String, Value)>, BuildError> {
    let guard = build(raw, schema)?;
    Ok(guard
        .iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.clone())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SchemaError, MISSING_REQUIRED, NOT_FINITE, UNDECLARED_KEY};
    use crate::schema::Bounds;
    use cfguard_validate::builtin;

    fn schema() -> Schema {
        Schema::builder()
            .field("A", builtin::integer())
            .field("B", builtin::url())
            .field("C", builtin::boolean())
            .build()
    }

    #[test]
    fn test_every_failure_reported_in_schema_order() {
        let raw = RawConfig::new().with("A", "notanum").with("C", "maybe");
        let err = build(&raw, &schema()).unwrap_err();
        let err = err.as_config().unwrap();
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(err.failures()[0].reason, "not an integer");
        assert_eq!(err.failures()[0].raw.as_deref(), Some("\"notanum\""));
        assert_eq!(err.failures()[1].reason, MISSING_REQUIRED);
        assert_eq!(err.failures()[1].raw, None);
        assert_eq!(err.failures()[2].reason, "not a boolean");
    }

    #[test]
    fn test_success_coerces_values() {
        let raw = RawConfig::new()
            .with("A", " 42 ")
            .with("B", "https://example.com/x")
            .with("C", "yes");
        let guard = build(&raw, &schema()).unwrap();
        assert_eq!(guard.get_int("A"), Ok(42));
        assert_eq!(guard.get_str("B"), Ok("https://example.com/x"));
        assert_eq!(guard.get_bool("C"), Ok(true));
    }

    #[test]
    fn test_schema_error_precedes_data_errors() {
        let bad = Schema::builder()
            .field("A", builtin::integer())
            .field("MAX", FieldSpec::new(builtin::integer()).with_default(10).required())
            .build();
        let raw = RawConfig::new().with("A", "garbage");
        let err = build(&raw, &bad).unwrap_err();
        assert_eq!(
            err.as_schema(),
            Some(&SchemaError::RequiredWithDefault { key: "MAX".to_string() })
        );
    }

    #[test]
    fn test_null_and_blank_are_absent_by_default() {
        let schema = Schema::builder()
            .field("N", FieldSpec::new(builtin::integer()).with_default(3))
            .field("S", FieldSpec::new(builtin::string()).optional())
            .build();
        let raw = RawConfig::new().with("N", RawValue::Null).with("S", "   ");
        let guard = build(&raw, &schema).unwrap();
        assert_eq!(guard.get_int("N"), Ok(3));
        assert_eq!(guard.get("S"), Ok(None));
    }

    #[test]
    fn test_blank_presented_under_present_policy() {
        let schema = Schema::builder()
            .field("S", FieldSpec::new(builtin::string()).optional())
            .field("N", FieldSpec::new(builtin::integer()).optional())
            .build();
        let raw = RawConfig::new().with("S", "").with("N", " ");
        let engine = Engine::new(BuildOptions::default().with_empty_values(EmptyValuePolicy::Present));
        let err = engine.build(&raw, &schema).unwrap_err();
        let err = err.as_config().unwrap();
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["N"]);
    }

    #[test]
    fn test_alias_fallback_and_precedence() {
        let schema = Schema::builder()
            .field("DATABASE_URL", FieldSpec::new(builtin::url()).alias("DB_URL"))
            .build();

        let raw = RawConfig::new().with("DB_URL", "postgres://db.internal/app");
        let guard = build(&raw, &schema).unwrap();
        assert_eq!(guard.get_str("DATABASE_URL"), Ok("postgres://db.internal/app"));

        let raw = RawConfig::new()
            .with("DATABASE_URL", "https://primary.example")
            .with("DB_URL", "https://secondary.example");
        let guard = Engine::new(BuildOptions::strict()).build(&raw, &schema).unwrap();
        assert_eq!(guard.get_str("DB_URL"), Ok("https://primary.example"));

        let raw = RawConfig::new()
            .with("DATABASE_URL", RawValue::Null)
            .with("DB_URL", "https://secondary.example");
        let guard = build(&raw, &schema).unwrap();
        assert_eq!(guard.get_str("DATABASE_URL"), Ok("https://secondary.example"));
    }

    #[test]
    fn test_bounds_rejection_reported_with_raw() {
        let schema = Schema::builder()
            .field("PORT", FieldSpec::new(builtin::integer()).with_bounds(Bounds::int_range(1, 65535)))
            .build();
        let err = build(&RawConfig::new().with("PORT", "70000"), &schema).unwrap_err();
        let failure = &err.as_config().unwrap().failures()[0];
        assert_eq!(failure.reason, "value 70000 above maximum 65535");
        assert_eq!(failure.raw.as_deref(), Some("\"70000\""));
    }

    #[test]
    fn test_strict_mode_reports_undeclared_after_fields() {
        let raw = RawConfig::new()
            .with("ZED", "1")
            .with("EXTRA", "x")
            .with("A", "notanum")
            .with("B", "https://x.example")
            .with("C", "true");
        let err = Engine::new(BuildOptions::strict()).build(&raw, &schema()).unwrap_err();
        let err = err.as_config().unwrap();
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["A", "EXTRA", "ZED"]);
        assert_eq!(err.failures()[1].reason, UNDECLARED_KEY);
    }

    #[test]
    fn test_lenient_mode_ignores_undeclared() {
        let raw = RawConfig::new()
            .with("A", "1")
            .with("B", "https://x.example")
            .with("C", "off")
            .with("UNRELATED", "whatever");
        let guard = build(&raw, &schema()).unwrap();
        assert!(!guard.contains_key("UNRELATED"));
        assert_eq!(guard.len(), 3);
    }

    #[test]
    fn test_custom_validator_non_finite_is_field_failure() {
        let nan = cfguard_validate::from_fn("nan", |_| Ok(Value::Float(f64::NAN)));
        let inf = cfguard_validate::from_fn("inf", |_| Ok(Value::Float(f64::INFINITY)));
        let schema = Schema::builder()
            .field("X", nan)
            .field("Y", inf)
            .field("Z", builtin::integer())
            .build();
        let raw = RawConfig::new().with("X", "anything").with("Y", "1e999").with("Z", "bad");
        let err = build(&raw, &schema).unwrap_err();
        let err = err.as_config().unwrap();
        assert_eq!(err.keys().collect::<Vec<_>>(), vec!["X", "Y", "Z"]);
        assert_eq!(err.failure_for("X").map(|f| f.reason.as_str()), Some(NOT_FINITE));
        assert_eq!(err.failure_for("Y").map(|f| f.reason.as_str()), Some(NOT_FINITE));
    }

    #[test]
    fn test_resolve_omits_unset() {
        let schema = Schema::builder()
            .field("A", FieldSpec::new(builtin::integer()).with_default(1))
            .field("B", FieldSpec::new(builtin::string()).optional())
            .build();
        let values = resolve(&RawConfig::new(), &schema).unwrap();
        assert_eq!(values, vec![("A".to_string(), Value::Int(1))]);
    }
}
