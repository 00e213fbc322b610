// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

fn is_alias_byte(b: u8, first: bool) -> bool {
    if first {
        b.is_ascii_alphabetic()
    } else {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }
}

fn validate(s: &str) -> Result<(), AliasError> {
    if s.is_empty() {
        return Err(AliasError::Empty);
    }
    for (i, b) in s.bytes().enumerate() {
        if !is_alias_byte(b, i == 0) {
            return Err(AliasError::InvalidCharacter { alias: s.to_string(), at: i });
        }
    }
    Ok(())
}

/// Validated alias: non-empty, matches `^[A-Za-z][\w-]*$`.
///
/// Primary key for oplets and for subtrees in the tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alias(String);

impl Alias {
    pub fn new(s: impl Into<String>) -> Result<Self, AliasError> {
        let s = s.into();
        validate(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for Alias {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Alias {
    type Error = AliasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Alias::new(value)
    }
}

impl TryFrom<&str> for Alias {
    type Error = AliasError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Alias::new(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias must be non-empty")]
    Empty,
    #[error("alias {alias:?} has an invalid character at byte offset {at}")]
    InvalidCharacter { alias: String, at: usize },
}

// Cached regex-equivalent byte-class check is inlined above rather than
// pulled in via `regex` — the alphabet is small and fixed, so a hand
// rolled scan avoids an extra dependency. OnceLock kept for parity with
// call sites that may want a lazily-built description string.
static PATTERN_DESCRIPTION: OnceLock<&'static str> = OnceLock::new();

pub fn pattern_description() -> &'static str {
    PATTERN_DESCRIPTION.get_or_init(|| r"^[A-Za-z][\w-]*$")
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
