// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Append-only ledger of refreshed codes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LinkError, LinkResult};
use crate::lock::FileLock;
use crate::table::{self, HistoryEntry};
use crate::types::Code;

/// Ledger of `(old_code, new_code)` pairs, one line per refresh.
///
/// Appends take an exclusive lock on the ledger file for the duration of a
/// single write. Prior entries are never read back or rewritten on this path.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    lock_timeout: Duration,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and sync it to disk.
    pub fn append(&self, old_code: &Code, new_code: &Code) -> LinkResult<()> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        let lock = FileLock::acquire(&self.path, &options, self.lock_timeout)?;

        let entry = HistoryEntry {
            old_code: old_code.clone(),
            new_code: new_code.clone(),
        };
        let io_err = |source| LinkError::StorageUnavailable {
            context: "appending history",
            path: self.path.clone(),
            source,
        };

        let mut file = lock.file();
        file.write_all(format!("{}\n", entry).as_bytes())
            .map_err(io_err)?;
        file.sync_data().map_err(io_err)?;

        tracing::info!(
            old_code = %old_code,
            new_code = %new_code,
            "Recorded code refresh"
        );
        Ok(())
    }

    /// All recorded entries in chronological order. Malformed lines are skipped.
    pub fn entries(&self) -> LinkResult<Vec<HistoryEntry>> {
        table::read_lines(&self.path)
    }
}
