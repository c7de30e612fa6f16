//! # Content Digest
//!
//! SHA-256 fingerprints of built configurations. A fingerprint identifies
//! the resolved key/value content, so operators can tell from a log line
//! whether two processes started with the same effective configuration.
//!
//! `ContentDigest` can only be computed from `CanonicalBytes`, so every
//! fingerprint is taken over the JCS form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;
use crate::value::Value;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Fingerprint a resolved configuration.
///
/// Entries map to a JSON object (unset entries become `null`) which is then
/// canonicalized and hashed. Entry order does not affect the result.
///
/// # Errors
///
/// Returns `CanonicalizationError::NonFiniteFloat` for NaN or infinite
/// floats, which JSON cannot represent faithfully.
pub fn fingerprint_entries<'a, I>(entries: I) -> Result<ContentDigest, CanonicalizationError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a Value>)>,
{
    let mut object = serde_json::Map::new();
    for (key, value) in entries {
        if let Some(Value::Float(x)) = value {
            if !x.is_finite() {
                return Err(CanonicalizationError::NonFiniteFloat {
                    key: key.to_string(),
                });
            }
        }
        object.insert(key.to_string(), serde_json::to_value(value)?);
    }
    let canonical = CanonicalBytes::new(&object)?;
    Ok(sha256_digest(&canonical))
}
