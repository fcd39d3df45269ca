// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! linkmap Core Library
//!
//! Maps a (keyword, src, creative) triple to a short hex code and back.
//! Provides code generation, the file-backed mapping store with locked
//! read-modify-write transactions, the refresh history ledger, request
//! sanitization and configuration parsing.

pub mod codegen;
pub mod config;
pub mod error;
pub mod history;
pub mod lock;
pub mod request;
pub mod store;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, GatewayConfig, StorageConfig};
pub use error::{LinkError, LinkResult, RowParseError, ValidationError};
pub use history::HistoryLog;
pub use request::{LookupRequest, UpsertRequest};
pub use store::{MappingStore, UpsertAction, UpsertOutcome};
pub use table::{HistoryEntry, MappingRow};
pub use types::{Code, Token, Triple};
