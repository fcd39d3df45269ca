// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Raw request parameters to validated store inputs.
//!
//! Missing parameters default to [`DEFAULT_TOKEN`]. A request where every
//! parameter is missing (or literally the default) is rejected before the
//! store is touched. Everything else is sanitized, never rejected.

use crate::error::ValidationError;
use crate::types::{Code, Token, Triple};

/// Value substituted for a parameter the caller did not send.
pub const DEFAULT_TOKEN: &str = "unknown";

/// Validated input for `MappingStore::upsert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRequest {
    pub triple: Triple,
    pub refresh: bool,
}

impl UpsertRequest {
    pub fn from_params(
        keyword: Option<&str>,
        src: Option<&str>,
        creative: Option<&str>,
        refresh: bool,
    ) -> Result<Self, ValidationError> {
        let keyword = keyword.unwrap_or(DEFAULT_TOKEN);
        let src = src.unwrap_or(DEFAULT_TOKEN);
        let creative = creative.unwrap_or(DEFAULT_TOKEN);

        if [keyword, src, creative].iter().all(|p| *p == DEFAULT_TOKEN) {
            return Err(ValidationError::NoParameters);
        }

        Ok(Self {
            triple: Triple::new(
                Token::sanitize(keyword),
                Token::sanitize(src),
                Token::sanitize(creative),
            ),
            refresh,
        })
    }
}

/// Validated input for `MappingStore::lookup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub code: Code,
}

impl LookupRequest {
    pub fn from_param(code: Option<&str>) -> Result<Self, ValidationError> {
        code.and_then(Code::sanitize)
            .map(|code| Self { code })
            .ok_or(ValidationError::MissingCode)
    }
}
