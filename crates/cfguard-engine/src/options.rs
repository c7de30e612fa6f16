//! Build options.
//!
//! Two policies govern the edges of a build: what to do with raw keys no
//! field declares, and whether blank text counts as a value. Both default to
//! the lenient choice. Options deserialize from the same JSON/YAML documents
//! as schema declarations, with unknown fields rejected.

use serde::{Deserialize, Serialize};

/// Handling of raw keys that no schema field (or alias) claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Ignore them.
    #[default]
    Lenient,
    /// Report each as a failure.
    Strict,
}

/// Whether empty or whitespace-only text counts as a presented value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyValuePolicy {
    /// Blank text is treated exactly like a missing key.
    #[default]
    Absent,
    /// Blank text is handed to the validator.
    Present,
}

/// Options for [`crate::Engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    pub unknown_keys: UnknownKeyPolicy,
    pub empty_values: EmptyValuePolicy,
}

impl BuildOptions {
    /// Defaults, except undeclared keys are failures.
    pub fn strict() -> Self {
        Self::default().with_unknown_keys(UnknownKeyPolicy::Strict)
    }

    #[must_use]
    pub fn with_unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    #[must_use]
    pub fn with_empty_values(mut self, policy: EmptyValuePolicy) -> Self {
        self.empty_values = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lenient() {
        let opts = BuildOptions::default();
        assert_eq!(opts.unknown_keys, UnknownKeyPolicy::Lenient);
        assert_eq!(opts.empty_values, EmptyValuePolicy::Absent);
        assert_eq!(BuildOptions::strict().unknown_keys, UnknownKeyPolicy::Strict);
    }

    #[test]
    fn test_deserialize_partial_document() {
        let opts: BuildOptions = serde_json::from_str(r#"{"unknown_keys":"strict"}"#).unwrap();
        assert_eq!(opts, BuildOptions::strict());

        let opts: BuildOptions = serde_yaml::from_str("empty_values: present\n").unwrap();
        assert_eq!(opts.empty_values, EmptyValuePolicy::Present);
        assert_eq!(opts.unknown_keys, UnknownKeyPolicy::Lenient);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        assert!(serde_json::from_str::<BuildOptions>(r#"{"strict":true}"#).is_err());
        assert!(serde_json::from_str::<BuildOptions>(r#"{"unknown_keys":"loose"}"#).is_err());
    }
}
