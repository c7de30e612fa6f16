//! # Built-in Validators
//!
//! Type validators coerce text into a primitive (`bool`, `int`, `float`,
//! `string`). Predicate validators (`url`, `email`, `path`) apply a purely
//! syntactic check and pass the raw text through unchanged. None of them
//! touch the network or the filesystem.
//!
//! Failure reasons are fixed strings so the same bad input always yields the
//! same message.

use std::sync::Arc;

use cfguard_core::{RawValue, Value, ValueKind};

use crate::contract::{Invalid, SharedValidator, Validator};

const NOT_A_BOOLEAN: &str = "not a boolean";
const NOT_AN_INTEGER: &str = "not an integer";
const NOT_A_NUMBER: &str = "not a number";
const NOT_A_STRING: &str = "not a string";
const NOT_A_URL: &str = "not a valid URL";
const NOT_AN_EMAIL: &str = "not a valid email";
const NOT_A_PATH: &str = "not a valid path";

const TRUE_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_TOKENS: [&str; 4] = ["false", "0", "no", "off"];

/// Boolean coercion.
///
/// Text is trimmed and matched case-insensitively against
/// `true|1|yes|on` and `false|0|no|off`. Integers `1` and `0` map to
/// true and false.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolValidator;

impl Validator for BoolValidator {
    fn name(&self) -> &str {
        "bool"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        match raw {
            RawValue::Bool(b) => Ok(Value::Bool(*b)),
            RawValue::Int(1) => Ok(Value::Bool(true)),
            RawValue::Int(0) => Ok(Value::Bool(false)),
            RawValue::Str(s) => {
                let token = s.trim();
                if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
                    Ok(Value::Bool(true))
                } else if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
                    Ok(Value::Bool(false))
                } else {
                    Err(Invalid::new(NOT_A_BOOLEAN))
                }
            }
            _ => Err(Invalid::new(NOT_A_BOOLEAN)),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Bool)
    }
}

/// Signed 64-bit integer coercion.
///
/// Text must be an optional `+`/`-` followed by ASCII digits (surrounding
/// whitespace is trimmed). Values outside the `i64` range are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntValidator;

impl Validator for IntValidator {
    fn name(&self) -> &str {
        "int"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        match raw {
            RawValue::Int(i) => Ok(Value::Int(*i)),
            RawValue::Str(s) => parse_decimal(s.trim())
                .map(Value::Int)
                .ok_or_else(|| Invalid::new(NOT_AN_INTEGER)),
            _ => Err(Invalid::new(NOT_AN_INTEGER)),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Int)
    }
}

fn parse_decimal(text: &str) -> Option<i64> {
    let digits = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<i64>().ok()
}

/// Finite 64-bit float coercion. Integers widen.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatValidator;

impl Validator for FloatValidator {
    fn name(&self) -> &str {
        "float"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        let parsed = match raw {
            RawValue::Float(x) => Some(*x),
            RawValue::Int(i) => Some(*i as f64),
            RawValue::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(x) if x.is_finite() => Ok(Value::Float(x)),
            _ => Err(Invalid::new(NOT_A_NUMBER)),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Float)
    }
}

/// String identity.
///
/// Text passes unchanged; already-typed scalars are rendered to their
/// textual form. Only the `Null` marker is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringValidator;

impl Validator for StringValidator {
    fn name(&self) -> &str {
        "string"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        match raw {
            RawValue::Null => Err(Invalid::new(NOT_A_STRING)),
            RawValue::Str(s) => Ok(Value::Str(s.clone())),
            other => Ok(Value::Str(other.to_string())),
        }
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

/// URL check, see [`is_url`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator;

impl Validator for UrlValidator {
    fn name(&self) -> &str {
        "url"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        pass_text_if(raw, is_url, NOT_A_URL)
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

/// Email check, see [`is_email`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl Validator for EmailValidator {
    fn name(&self) -> &str {
        "email"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        pass_text_if(raw, is_email, NOT_AN_EMAIL)
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

/// Path check, see [`is_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathValidator;

impl Validator for PathValidator {
    fn name(&self) -> &str {
        "path"
    }

    fn validate(&self, raw: &RawValue) -> Result<Value, Invalid> {
        pass_text_if(raw, is_path, NOT_A_PATH)
    }

    fn kind(&self) -> Option<ValueKind> {
        Some(ValueKind::Str)
    }
}

fn pass_text_if(raw: &RawValue, check: fn(&str) -> bool, reason: &'static str) -> Result<Value, Invalid> {
    match raw.as_text() {
        Some(text) if check(text) => Ok(Value::Str(text.to_string())),
        _ => Err(Invalid::new(reason)),
    }
}

/// Syntactic URL check.
///
/// Requires a scheme token followed by `://`, no whitespace, and a
/// non-empty host once parsed. Nothing is resolved or fetched.
pub fn is_url(text: &str) -> bool {
    let Some((scheme, _)) = text.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || text.chars().any(char::is_whitespace) {
        return false;
    }
    url::Url::parse(text)
        .ok()
        .and_then(|u| u.host_str().map(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// Syntactic email check.
///
/// Exactly one `@`, a non-empty local part, a non-empty domain part that
/// contains a `.`, and no whitespace anywhere.
pub fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = text.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && domain.contains('.')
        }
        _ => false,
    }
}

/// Syntactic path check: non-empty and free of NUL bytes. Existence is not
/// checked.
pub fn is_path(text: &str) -> bool {
    !text.is_empty() && !text.contains('\0')
}

/// Shared [`BoolValidator`].
pub fn boolean() -> SharedValidator {
    Arc::new(BoolValidator)
}

/// Shared [`IntValidator`].
pub fn integer() -> SharedValidator {
    Arc::new(IntValidator)
}

/// Shared [`FloatValidator`].
pub fn float() -> SharedValidator {
    Arc::new(FloatValidator)
}

/// Shared [`StringValidator`].
pub fn string() -> SharedValidator {
    Arc::new(StringValidator)
}

/// Shared [`UrlValidator`].
pub fn url() -> SharedValidator {
    Arc::new(UrlValidator)
}

/// Shared [`EmailValidator`].
pub fn email() -> SharedValidator {
    Arc::new(EmailValidator)
}

/// Shared [`PathValidator`].
pub fn path() -> SharedValidator {
    Arc::new(PathValidator)
}
