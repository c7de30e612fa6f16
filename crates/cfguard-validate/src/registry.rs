//! # Validator Registry
//!
//! Maps type tags (`"int"`, `"url"`, ...) to shared validators so that
//! declarative schemas can name a validator instead of constructing one.
//! Tags are trimmed and matched case-insensitively.

use std::collections::HashMap;

use thiserror::Error;

use crate::builtin;
use crate::contract::SharedValidator;

/// Error when registering a validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The tag is already taken. Use [`ValidatorRegistry::replace`] to
    /// override an existing entry deliberately.
    #[error("validator tag '{tag}' is already registered")]
    DuplicateTag {
        /// The normalized tag.
        tag: String,
    },

    /// The tag is empty after trimming.
    #[error("validator tag must not be empty")]
    EmptyTag,
}

/// A tag → validator catalogue.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, SharedValidator>,
}

impl ValidatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in validators:
    ///
    /// | Tags                  | Validator |
    /// |-----------------------|-----------|
    /// | `bool`, `boolean`     | [`builtin::BoolValidator`]   |
    /// | `int`, `integer`      | [`builtin::IntValidator`]    |
    /// | `float`, `number`     | [`builtin::FloatValidator`]  |
    /// | `str`, `string`       | [`builtin::StringValidator`] |
    /// | `url`                 | [`builtin::UrlValidator`]    |
    /// | `email`               | [`builtin::EmailValidator`]  |
    /// | `path`                | [`builtin::PathValidator`]   |
    pub fn builtin() -> Self {
        let entries: [(&[&str], SharedValidator); 7] = [
            (&["bool", "boolean"][..], builtin::boolean()),
            (&["int", "integer"][..], builtin::integer()),
            (&["float", "number"][..], builtin::float()),
            (&["str", "string"][..], builtin::string()),
            (&["url"][..], builtin::url()),
            (&["email"][..], builtin::email()),
            (&["path"][..], builtin::path()),
        ];
        let mut validators = HashMap::new();
        for (tags, validator) in entries {
            for tag in tags {
                validators.insert((*tag).to_string(), validator.clone());
            }
        }
        Self { validators }
    }

    /// Register a validator under a new tag.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::EmptyTag` for a blank tag and
    /// `RegistryError::DuplicateTag` if the tag is already taken.
    pub fn register(&mut self, tag: &str, validator: SharedValidator) -> Result<(), RegistryError> {
        let tag = normalize(tag).ok_or(RegistryError::EmptyTag)?;
        if self.validators.contains_key(&tag) {
            tracing::debug!(tag = %tag, "validator registration rejected: tag taken");
            return Err(RegistryError::DuplicateTag { tag });
        }
        tracing::debug!(tag = %tag, validator = validator.name(), "validator registered");
        self.validators.insert(tag, validator);
        Ok(())
    }

    /// Register a validator, replacing any existing entry for the tag.
    /// Returns the replaced validator.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::EmptyTag` for a blank tag.
    pub fn replace(
        &mut self,
        tag: &str,
        validator: SharedValidator,
    ) -> Result<Option<SharedValidator>, RegistryError> {
        let tag = normalize(tag).ok_or(RegistryError::EmptyTag)?;
        let previous = self.validators.insert(tag.clone(), validator);
        if previous.is_some() {
            tracing::debug!(tag = %tag, "validator replaced");
        }
        Ok(previous)
    }

    /// Look up a validator by tag.
    pub fn resolve(&self, tag: &str) -> Option<SharedValidator> {
        normalize(tag).and_then(|t| self.validators.get(&t).cloned())
    }

    pub fn contains(&self, tag: &str) -> bool {
        normalize(tag).is_some_and(|t| self.validators.contains_key(&t))
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

fn normalize(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::predicate;
    use cfguard_core::{RawValue, Value};

    #[test]
    fn test_builtin_tags() {
        let registry = ValidatorRegistry::builtin();
        assert_eq!(
            registry.tags(),
            vec!["bool", "boolean", "email", "float", "int", "integer", "number", "path", "str", "string", "url"]
        );
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = ValidatorRegistry::builtin();
        let v = registry.resolve(" INT ").expect("int is built in");
        assert_eq!(v.validate(&RawValue::from("5")), Ok(Value::Int(5)));
        assert!(registry.resolve("Boolean").is_some());
        assert!(registry.contains("URL"));
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let registry = ValidatorRegistry::builtin();
        assert!(registry.resolve("uuid").is_none());
        assert!(registry.resolve("").is_none());
        assert!(!registry.contains("  "));
    }

    #[test]
    fn test_register_custom_validator() {
        let mut registry = ValidatorRegistry::builtin();
        let hex = predicate("hex", |s| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit()), "not hex");
        registry.register("Hex", hex).unwrap();
        let v = registry.resolve("hex").unwrap();
        assert!(v.validate(&RawValue::from("deadBEEF")).is_ok());
        assert_eq!(v.validate(&RawValue::from("xyz")).unwrap_err().reason(), "not hex");
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut registry = ValidatorRegistry::builtin();
        let err = registry.register("INT", builtin::string()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTag { tag: "int".to_string() });
        // Original entry untouched.
        assert_eq!(registry.resolve("int").unwrap().name(), "int");
    }

    #[test]
    fn test_register_empty_tag_rejected() {
        let mut registry = ValidatorRegistry::new();
        assert_eq!(registry.register("   ", builtin::string()), Err(RegistryError::EmptyTag));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_replace_overrides() {
        let mut registry = ValidatorRegistry::builtin();
        let previous = registry.replace("path", builtin::string()).unwrap();
        assert_eq!(previous.map(|v| v.name().to_string()), Some("path".to_string()));
        assert_eq!(registry.resolve("path").unwrap().name(), "string");
    }
}
