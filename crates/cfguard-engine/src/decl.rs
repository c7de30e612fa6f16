//! # Declarative Schemas
//!
//! A schema can be written as a JSON or YAML document mapping each key to
//! either a bare type tag or a field object:
//!
//! ```yaml
//! DATABASE_URL: url
//! MAX_CONNECTIONS:
//!   type: int
//!   default: 10
//!   min: 1
//!   max: 500
//! DEBUG:
//!   type: bool
//!   required: false
//!   aliases: [APP_DEBUG]
//! ```
//!
//! Document order becomes schema order. Type tags are resolved against a
//! [`ValidatorRegistry`] when the declaration is turned into a [`Schema`].

use std::fmt;

use cfguard_core::Value;
use cfguard_validate::ValidatorRegistry;
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;
use crate::schema::{Bounds, FieldSpec, Schema};

/// One field as written in a declaration.
///
/// Deserializes from a string (a bare tag) or a map (a field object) only.
/// Sequences and scalars of other types are rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldDecl {
    /// A bare type tag: a required field with no default.
    Tag(String),
    /// A full field object.
    Spec(FieldSpecDecl),
}

/// The object form of a field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpecDecl {
    /// Registry tag of the validator.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Explicit requiredness. When omitted, a field is required unless it
    /// declares a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    /// Numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpecDecl {
    fn bounds(&self, key: &str) -> Result<Option<Bounds>, SchemaError> {
        let numeric = self.min.is_some() || self.max.is_some();
        let length = self.min_length.is_some() || self.max_length.is_some();
        let invalid = |reason: &str| SchemaError::InvalidBounds {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        match (numeric, length) {
            (false, false) => Ok(None),
            (true, true) => Err(invalid("numeric and length bounds cannot be combined")),
            (false, true) => Ok(Some(Bounds::Length {
                min: self.min_length,
                max: self.max_length,
            })),
            (true, false) => {
                for bound in [&self.min, &self.max].into_iter().flatten() {
                    if !matches!(bound, Value::Int(_) | Value::Float(_)) {
                        return Err(invalid("min and max must be numbers"));
                    }
                }
                let any_float = [&self.min, &self.max]
                    .into_iter()
                    .flatten()
                    .any(|b| matches!(b, Value::Float(_)));
                if any_float {
                    Ok(Some(Bounds::Float {
                        min: self.min.as_ref().and_then(widen),
                        max: self.max.as_ref().and_then(widen),
                    }))
                } else {
                    Ok(Some(Bounds::Int {
                        min: self.min.as_ref().and_then(Value::as_int),
                        max: self.max.as_ref().and_then(Value::as_int),
                    }))
                }
            }
        }
    }
}

fn widen(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// An ordered schema declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDecl {
    fields: Vec<(String, FieldDecl)>,
}

impl SchemaDecl {
    /// Parse a JSON declaration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Declaration` if the document is not a valid
    /// declaration.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text).map_err(|e| SchemaError::Declaration {
            reason: e.to_string(),
        })
    }

    /// Parse a YAML declaration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Declaration` if the document is not a valid
    /// declaration.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(text).map_err(|e| SchemaError::Declaration {
            reason: e.to_string(),
        })
    }

    pub fn fields(&self) -> &[(String, FieldDecl)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve every type tag and build the schema.
    ///
    /// The result is not checked; the engine checks it before every build,
    /// and [`Schema::check`] is available to check it up front.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownTypeTag` for an unregistered tag and
    /// `SchemaError::InvalidBounds` for bounds that cannot be expressed.
    pub fn into_schema(self, registry: &ValidatorRegistry) -> Result<Schema, SchemaError> {
        let mut builder = Schema::builder();
        for (key, decl) in self.fields {
            builder = match decl {
                FieldDecl::Tag(tag) => builder.field_tag(key, &tag, registry)?,
                FieldDecl::Spec(spec) => {
                    let field = spec_into_field(&key, spec, registry)?;
                    builder.field(key, field)
                }
            };
        }
        Ok(builder.build())
    }
}

fn spec_into_field(
    key: &str,
    decl: FieldSpecDecl,
    registry: &ValidatorRegistry,
) -> Result<FieldSpec, SchemaError> {
    let validator = registry
        .resolve(&decl.type_tag)
        .ok_or_else(|| SchemaError::UnknownTypeTag {
            key: key.to_string(),
            tag: decl.type_tag.clone(),
        })?;
    let bounds = decl.bounds(key)?;

    let mut field = FieldSpec::new(validator);
    if let Some(default) = decl.default {
        field = field.with_default(default);
    }
    match decl.required {
        Some(true) => field = field.required(),
        Some(false) => field = field.optional(),
        None => {}
    }
    for alias in decl.aliases {
        field = field.alias(alias);
    }
    if let Some(bounds) = bounds {
        field = field.with_bounds(bounds);
    }
    if let Some(description) = decl.description {
        field = field.describe(description);
    }
    Ok(field)
}

impl Serialize for SchemaDecl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, decl) in &self.fields {
            map.serialize_entry(key, decl)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldDecl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = FieldDecl;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a type tag or a field object")
            }

            fn visit_str<E: de::Error>(self, tag: &str) -> Result<FieldDecl, E> {
                Ok(FieldDecl::Tag(tag.to_string()))
            }

            fn visit_string<E: de::Error>(self, tag: String) -> Result<FieldDecl, E> {
                Ok(FieldDecl::Tag(tag))
            }

            fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<FieldDecl, A::Error> {
                FieldSpecDecl::deserialize(MapAccessDeserializer::new(access)).map(FieldDecl::Spec)
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

impl<'de> Deserialize<'de> for SchemaDecl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclVisitor;

        impl<'de> Visitor<'de> for DeclVisitor {
            type Value = SchemaDecl;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from configuration key to field declaration")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SchemaDecl, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, decl)) = access.next_entry::<String, FieldDecl>()? {
                    fields.push((key, decl));
                }
                Ok(SchemaDecl { fields })
            }

            fn visit_unit<E: de::Error>(self) -> Result<SchemaDecl, E> {
                Ok(SchemaDecl::default())
            }
        }

        deserializer.deserialize_map(DeclVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "\
DATABASE_URL: url
MAX_CONNECTIONS:
  type: int
  default: 10
  min: 1
  max: 500
DEBUG:
  type: bool
  required: false
  aliases: [APP_DEBUG]
  description: Verbose logging
";

    #[test]
    fn test_yaml_preserves_document_order() {
        let decl = SchemaDecl::from_yaml_str(YAML).unwrap();
        let keys: Vec<&str> = decl.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["DATABASE_URL", "MAX_CONNECTIONS", "DEBUG"]);
        assert_eq!(decl.fields()[0].1, FieldDecl::Tag("url".to_string()));
    }

    #[test]
    fn test_yaml_into_schema() {
        let schema = SchemaDecl::from_yaml_str(YAML)
            .unwrap()
            .into_schema(&ValidatorRegistry::builtin())
            .unwrap();
        assert!(schema.check().is_ok());

        let url = schema.get("DATABASE_URL").unwrap();
        assert!(url.is_required());
        assert_eq!(url.validator().name(), "url");

        let max = schema.get("MAX_CONNECTIONS").unwrap();
        assert!(!max.is_required());
        assert_eq!(max.default_value(), Some(&Value::Int(10)));
        assert_eq!(max.bounds(), Some(&Bounds::int_range(1, 500)));

        let debug = schema.get("DEBUG").unwrap();
        assert!(!debug.is_required());
        assert_eq!(debug.aliases(), ["APP_DEBUG".to_string()]);
        assert_eq!(debug.description(), Some("Verbose logging"));
    }

    #[test]
    fn test_json_declaration() {
        let decl = SchemaDecl::from_json_str(
            r#"{"B": "string", "A": {"type": "float", "min": 0, "max": 1.5}, "S": {"type": "str", "min_length": 8}}"#,
        )
        .unwrap();
        let schema = decl.into_schema(&ValidatorRegistry::builtin()).unwrap();
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["B", "A", "S"]);
        assert_eq!(
            schema.get("A").and_then(FieldSpec::bounds),
            Some(&Bounds::Float { min: Some(0.0), max: Some(1.5) })
        );
        assert_eq!(
            schema.get("S").and_then(FieldSpec::bounds),
            Some(&Bounds::Length { min: Some(8), max: None })
        );
    }

    #[test]
    fn test_explicit_required_with_default_fails_check() {
        let schema = SchemaDecl::from_json_str(r#"{"MAX": {"type": "int", "required": true, "default": 10}}"#)
            .unwrap()
            .into_schema(&ValidatorRegistry::builtin())
            .unwrap();
        assert_eq!(
            schema.check(),
            Err(SchemaError::RequiredWithDefault { key: "MAX".to_string() })
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = SchemaDecl::from_json_str(r#"{"ID": "uuid"}"#)
            .unwrap()
            .into_schema(&ValidatorRegistry::builtin())
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTypeTag { .. }));

        let err = SchemaDecl::from_json_str(r#"{"ID": {"type": "uuid"}}"#)
            .unwrap()
            .into_schema(&ValidatorRegistry::builtin())
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTypeTag { .. }));
    }

    #[test]
    fn test_bad_bounds_declarations() {
        let registry = ValidatorRegistry::builtin();
        let mixed = SchemaDecl::from_json_str(r#"{"X": {"type": "str", "min": 1, "min_length": 2}}"#)
            .unwrap()
            .into_schema(&registry);
        assert!(matches!(mixed, Err(SchemaError::InvalidBounds { .. })));

        let textual = SchemaDecl::from_json_str(r#"{"X": {"type": "int", "min": "one"}}"#)
            .unwrap()
            .into_schema(&registry);
        assert!(matches!(textual, Err(SchemaError::InvalidBounds { .. })));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            SchemaDecl::from_json_str("[1, 2]"),
            Err(SchemaError::Declaration { .. })
        ));
        assert!(matches!(
            SchemaDecl::from_json_str(r#"{"X": {"type": "int", "requierd": true}}"#),
            Err(SchemaError::Declaration { .. })
        ));
        assert!(matches!(
            SchemaDecl::from_yaml_str("X: [int]"),
            Err(SchemaError::Declaration { .. })
        ));
    }

    #[test]
    fn test_positional_field_forms_rejected() {
        assert!(matches!(
            SchemaDecl::from_json_str(r#"{"X": ["int", true, 5]}"#),
            Err(SchemaError::Declaration { .. })
        ));
        assert!(matches!(
            SchemaDecl::from_yaml_str("X:\n  - int\n  - true\n"),
            Err(SchemaError::Declaration { .. })
        ));
        assert!(matches!(
            SchemaDecl::from_json_str(r#"{"X": 5}"#),
            Err(SchemaError::Declaration { .. })
        ));
        assert!(matches!(
            SchemaDecl::from_json_str(r#"{"X": {"required": false}}"#),
            Err(SchemaError::Declaration { .. })
        ));
    }

    #[test]
    fn test_empty_documents() {
        assert!(SchemaDecl::from_json_str("{}").unwrap().is_empty());
        assert!(SchemaDecl::from_yaml_str("{}").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_keeps_order() {
        let decl = SchemaDecl::from_json_str(r#"{"Z": "int", "A": {"type": "bool", "required": false}}"#).unwrap();
        let text = serde_json::to_string(&decl).unwrap();
        assert_eq!(text, r#"{"Z":"int","A":{"type":"bool","required":false}}"#);
    }
}
