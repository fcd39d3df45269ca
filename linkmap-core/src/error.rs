// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for linkmap.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`.
//! Not-found on lookup is `Ok(None)`, never an error variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Code;

/// Top-level error type for the mapping store.
#[derive(Debug, Error)]
pub enum LinkError {
    // =========================================================================
    // Boundary Errors - Rejected Before Any Storage Access
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    ConfigInvalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Storage unavailable: {context} ({path}) - {source}")]
    StorageUnavailable {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock on {path} not acquired within {waited_ms}ms")]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    /// The table change is committed; only the audit append failed.
    #[error("History append failed after committing code {committed}: {source}")]
    HistoryAppend {
        committed: Code,
        #[source]
        source: Box<LinkError>,
    },
}

impl LinkError {
    /// Whether the caller may retry the same call unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }

    /// Short label for metrics and logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                "config"
            }
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::LockTimeout { .. } => "lock_timeout",
            Self::HistoryAppend { .. } => "history_append",
        }
    }
}

/// Input rejected at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("At least one parameter must be given")]
    NoParameters,

    #[error("Missing code")]
    MissingCode,

    #[error("Invalid {field}: {value:?} - {reason}")]
    InvalidToken {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// A persisted line that could not be parsed. Recovered by skipping the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    #[error("expected {expected} space-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("bad field: {0}")]
    Field(#[from] ValidationError),
}

/// Result type alias using LinkError.
pub type LinkResult<T> = Result<T, LinkError>;
