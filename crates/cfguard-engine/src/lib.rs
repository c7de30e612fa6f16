//! # cfguard-engine: Schema Validation Engine
//!
//! Checks a raw key/value mapping against a declared [`Schema`] in a single
//! pass, reports every failing key at once, and freezes a successful result
//! into an immutable, typed [`ConfigGuard`].
//!
//! ```
//! use cfguard_core::RawConfig;
//! use cfguard_engine::{build, FieldSpec, Schema};
//! use cfguard_validate::builtin;
//!
//! let schema = Schema::builder()
//!     .field("DATABASE_URL", builtin::url())
//!     .field("MAX_CONNECTIONS", FieldSpec::new(builtin::integer()).with_default(10))
//!     .field("DEBUG", FieldSpec::new(builtin::boolean()).optional())
//!     .build();
//!
//! let raw = RawConfig::new().with("DATABASE_URL", "postgres://db.internal/app");
//! let config = build(&raw, &schema).unwrap();
//! assert_eq!(config.get_int("MAX_CONNECTIONS"), Ok(10));
//! assert_eq!(config.get("DEBUG"), Ok(None));
//! assert!(config.set("DEBUG", true).is_err());
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Schema errors before data errors.** A malformed schema is a
//!    programming error and fails the build before any raw value is looked
//!    at, even when the raw data is also bad.
//!
//! 2. **Aggregate, don't short-circuit.** Every declared key is checked on
//!    every build. The caller gets one [`ConfigError`] listing all failures
//!    in schema order.
//!
//! 3. **Immutable by construction.** A [`ConfigGuard`] offers no `&mut`
//!    access. Attempted writes return [`AccessError`].
//!
//! 4. **No I/O.** Reading the environment or files is the caller's job.
//!    The engine sees only an in-memory [`RawConfig`](cfguard_core::RawConfig).
//!
//! ## Crate Policy
//!
//! - Depends on `cfguard-core` and `cfguard-validate` internally.
//! - Raw values appear in failure records only in rendered, truncated form
//!   and are never logged.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod decl;
pub mod engine;
pub mod error;
pub mod guard;
pub mod options;
pub mod schema;

pub use decl::{FieldDecl, FieldSpecDecl, SchemaDecl};
pub use engine::{build, resolve, Engine};
pub use error::{
    AccessError, BuildError, ConfigError, FieldFailure, GuardError, LookupError, SchemaError,
    MISSING_REQUIRED, NOT_FINITE, UNDECLARED_KEY,
};
pub use guard::{ConfigGuard, Iter};
pub use options::{BuildOptions, EmptyValuePolicy, UnknownKeyPolicy};
pub use schema::{Bounds, FieldSpec, Schema, SchemaBuilder};
