//! # Error Types
//!
//! Errors raised by the canonical serialization pipeline. Validation,
//! schema, and lookup errors live with the crates that raise them.

use thiserror::Error;

/// Error during canonical serialization of a configuration.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and infinities have no JSON representation and would collapse to
    /// `null`, making two different configurations hash the same.
    #[error("non-finite float for key '{key}' has no canonical representation")]
    NonFiniteFloat {
        /// Key holding the offending value.
        key: String,
    },

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
