// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! `Token` and `Code` validate their character set and length at creation
//! time, so everything that reaches the store is already well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum token length in chars.
pub const MAX_TOKEN_LEN: usize = 64;
/// Maximum code length in hex digits.
pub const MAX_CODE_LEN: usize = 32;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

/// One component of a triple.
/// ASCII alphanumeric with hyphens/underscores, max 64 chars, may be empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Create a new Token with validation.
    pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.len() > MAX_TOKEN_LEN {
            return Err(ValidationError::InvalidToken {
                field,
                reason: format!("too long: {} chars (max {})", value.len(), MAX_TOKEN_LEN),
                value,
            });
        }

        if !value.chars().all(is_token_char) {
            return Err(ValidationError::InvalidToken {
                field,
                value,
                reason: "only alphanumeric characters, hyphens, and underscores are allowed"
                    .to_string(),
            });
        }

        Ok(Self(value))
    }

    /// Strip every disallowed char, then truncate to the maximum length.
    pub fn sanitize(raw: &str) -> Self {
        Self(raw.chars().filter(|&c| is_token_char(c)).take(MAX_TOKEN_LEN).collect())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Token {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new("token", value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Short identifier handed out for a triple.
/// Non-empty lowercase hex, max 32 digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    /// Create a new Code with validation.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::MissingCode);
        }

        if value.len() > MAX_CODE_LEN || !value.chars().all(is_code_char) {
            return Err(ValidationError::InvalidToken {
                field: "code",
                value,
                reason: format!("must be 1-{} lowercase hex digits", MAX_CODE_LEN),
            });
        }

        Ok(Self(value))
    }

    /// Wrap a freshly encoded digest. `hex::encode` output is lowercase.
    pub(crate) fn from_digest(hex: String) -> Self {
        debug_assert!(!hex.is_empty() && hex.len() <= MAX_CODE_LEN);
        Self(hex)
    }

    /// Strip non-hex chars and truncate; `None` when nothing is left.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|&c| is_code_char(c))
            .take(MAX_CODE_LEN)
            .collect();
        (!cleaned.is_empty()).then_some(Self(cleaned))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Code {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

/// The (keyword, src, creative) key of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub keyword: Token,
    pub src: Token,
    pub creative: Token,
}

impl Triple {
    pub fn new(keyword: Token, src: Token, creative: Token) -> Self {
        Self {
            keyword,
            src,
            creative,
        }
    }

    /// Build a triple from raw strings, validating each component.
    pub fn parse(keyword: &str, src: &str, creative: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            keyword: Token::new("keyword", keyword)?,
            src: Token::new("src", src)?,
            creative: Token::new("creative", creative)?,
        })
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.keyword, self.src, self.creative)
    }
}
