//! # Composite Identities
//!
//! Remote objects are addressed by multi-part keys such as `123456789012,default` that are
//! packed into one string for tracking and import. The codec joins parts with a reserved
//! delimiter and splits them back with a bounded split.
//!
//! Parts are **not escaped**. A part that itself contains the delimiter packs without
//! complaint (a warning is logged), but parsing the result is ambiguous: the bounded split
//! folds every surplus delimiter into the last part.

use thiserror::Error;
use tracing::warn;

/// Errors raised while packing or parsing a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity part {index} is empty")]
    EmptyPart { index: usize },

    #[error("unexpected format of ID ({id}), expected {expected}")]
    Malformed { id: String, expected: String },
}

/// Joins non-empty parts with `delimiter`.
pub fn pack<S: AsRef<str>>(parts: &[S], delimiter: char) -> Result<String, IdentityError> {
    let mut packed = String::new();
    for (index, part) in parts.iter().enumerate() {
        let part = part.as_ref();
        if part.is_empty() {
            return Err(IdentityError::EmptyPart { index });
        }
        if part.contains(delimiter) {
            warn!(part, %delimiter, "Identity part contains the delimiter; parsing will be ambiguous");
        }
        if index > 0 {
            packed.push(delimiter);
        }
        packed.push_str(part);
    }
    Ok(packed)
}

/// Splits `key` on `delimiter` into exactly `arity` non-empty pieces.
pub fn parse(key: &str, delimiter: char, arity: usize) -> Result<Vec<String>, IdentityError> {
    let parts: Vec<String> = key.splitn(arity, delimiter).map(str::to_string).collect();
    if arity == 0 || parts.len() != arity || parts.iter().any(String::is_empty) {
        return Err(IdentityError::Malformed {
            id: key.to_string(),
            expected: format!("{} parts separated by '{delimiter}'", arity.max(1)),
        });
    }
    Ok(parts)
}

/// The identity layout of one resource family.
///
/// `fields` names the declared attributes that make up the key, in key order. The codec's
/// arity is the number of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCodec {
    pub delimiter: char,
    pub fields: &'static [&'static str],
}

impl IdentityCodec {
    pub const fn new(delimiter: char, fields: &'static [&'static str]) -> Self {
        Self { delimiter, fields }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn pack<S: AsRef<str>>(&self, parts: &[S]) -> Result<String, IdentityError> {
        if parts.len() != self.arity() {
            return Err(IdentityError::Malformed {
                id: parts
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(&self.delimiter.to_string()),
                expected: self.expected(),
            });
        }
        pack(parts, self.delimiter)
    }

    pub fn parse(&self, key: &str) -> Result<Vec<String>, IdentityError> {
        parse(key, self.delimiter, self.arity()).map_err(|e| match e {
            IdentityError::Malformed { id, .. } => IdentityError::Malformed {
                id,
                expected: self.expected(),
            },
            other => other,
        })
    }

    /// Human-readable key layout, e.g. `AWS_ACCOUNT_ID,NAMESPACE`.
    pub fn expected(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.to_uppercase())
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }
}
