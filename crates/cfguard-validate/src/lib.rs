//! # cfguard-validate: Validator Contract & Catalogue
//!
//! A validator takes one presented [`RawValue`] and either returns a coerced
//! [`Value`] of a fixed target type or an [`Invalid`] reason. Validators are
//! pure: no I/O, no hidden state, same input same answer. Whether a value
//! was presented at all is the engine's business, not the validator's.
//!
//! ## Modules
//!
//! - [`contract`]: the [`Validator`] trait, [`Invalid`], and constructors for
//!   caller-defined validators ([`predicate`], [`from_fn`], [`one_of`]).
//! - [`builtin`]: type validators (bool, int, float, string) and predicate
//!   validators (url, email, path).
//! - [`registry`]: a tag → validator catalogue used to resolve bare type tags
//!   in schema declarations.
//!
//! [`RawValue`]: cfguard_core::RawValue
//! [`Value`]: cfguard_core::Value

pub mod builtin;
pub mod contract;
pub mod registry;

pub use builtin::{is_email, is_path, is_url};
pub use contract::{from_fn, one_of, predicate, Invalid, SharedValidator, Validator};
pub use registry::{RegistryError, ValidatorRegistry};
