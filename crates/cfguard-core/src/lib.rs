//! # cfguard-core: Foundational Types for config-guard
//!
//! Leaf crate of the workspace. It defines the value model shared by the
//! validator catalogue and the engine, and the canonical byte pipeline used
//! to fingerprint a built configuration.
//!
//! ## Key Design Principles
//!
//! 1. **Two value types, one direction.** [`RawValue`] is what collaborators
//!    hand in (text from the environment or an already-typed scalar).
//!    [`Value`] is what validators hand out. Only validators convert one into
//!    the other.
//!
//! 2. **`Null` is the "not set" marker.** A raw `Null` and a missing entry are
//!    the same thing to the engine.
//!
//! 3. **Fingerprints flow through [`CanonicalBytes`].** The only way to digest
//!    a configuration is through the JCS pipeline, so two processes holding the
//!    same configuration compute the same fingerprint.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cfguard-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod raw;
pub mod value;

pub use canonical::CanonicalBytes;
pub use digest::{fingerprint_entries, sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::CanonicalizationError;
pub use raw::{RawConfig, RawValue};
pub use value::{Value, ValueKind};
