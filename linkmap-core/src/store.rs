// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! File-backed mapping store.
//!
//! The table is a plain line file owned by one [`MappingStore`] per process.
//! Writers serialize on an exclusive lock over a sidecar lock file for the
//! whole load → decide → persist cycle and replace the table by atomic
//! rename. Readers take no lock and always see a complete table.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::codegen;
use crate::config::StorageConfig;
use crate::error::{LinkError, LinkResult};
use crate::history::HistoryLog;
use crate::lock::FileLock;
use crate::table::{self, MappingRow};
use crate::types::{Code, Triple};

/// What an upsert did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertAction {
    /// The triple already had a code; nothing was written.
    Existing,
    /// A new row was appended.
    Created,
    /// An existing row received a new code.
    Refreshed { previous: Code },
}

impl UpsertAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Existing => "existing",
            Self::Created => "created",
            Self::Refreshed { .. } => "refreshed",
        }
    }
}

/// Result of a committed upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub code: Code,
    pub action: UpsertAction,
}

/// Mapping store over one table file and one history ledger.
#[derive(Debug, Clone)]
pub struct MappingStore {
    config: StorageConfig,
    table_path: PathBuf,
    lock_path: PathBuf,
    history: HistoryLog,
}

impl MappingStore {
    /// Open the store, creating the data directory and empty files as needed.
    ///
    /// # Errors
    /// `StorageUnavailable` if the directory or any file cannot be created.
    pub fn open(config: StorageConfig) -> LinkResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| {
            LinkError::StorageUnavailable {
                context: "creating data directory",
                path: config.data_dir.clone(),
                source,
            }
        })?;

        let table_path = config.mappings_path();
        let lock_path = config.lock_path();
        let history_path = config.history_path();
        for path in [&table_path, &lock_path, &history_path] {
            touch(path)?;
        }

        tracing::info!(
            table = %table_path.display(),
            history = %history_path.display(),
            lock_timeout_ms = config.lock_timeout.as_millis() as u64,
            "MappingStore opened"
        );

        Ok(Self {
            history: HistoryLog::new(history_path, config.lock_timeout),
            table_path,
            lock_path,
            config,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Resolve the code for `triple`, creating it if needed, or force a new
    /// code when `refresh` is set.
    ///
    /// A refresh that replaces an existing code appends one history entry
    /// after the table transaction has committed.
    ///
    /// # Errors
    /// - `LockTimeout` if another writer holds the table past the bound.
    /// - `StorageUnavailable` if the table cannot be read or replaced. The
    ///   table is left exactly as it was.
    /// - `HistoryAppend` if the table change committed but the ledger append
    ///   failed. The committed code is carried in the error.
    pub fn upsert(&self, triple: &Triple, refresh: bool) -> LinkResult<UpsertOutcome> {
        let outcome = self.transact(triple, refresh)?;

        if let UpsertAction::Refreshed { previous } = &outcome.action {
            self.history
                .append(previous, &outcome.code)
                .map_err(|e| {
                    tracing::error!(
                        code = %outcome.code,
                        previous = %previous,
                        error = %e,
                        "History append failed after commit"
                    );
                    LinkError::HistoryAppend {
                        committed: outcome.code.clone(),
                        source: Box::new(e),
                    }
                })?;
        }

        Ok(outcome)
    }

    /// One locked load → decide → persist cycle.
    fn transact(&self, triple: &Triple, refresh: bool) -> LinkResult<UpsertOutcome> {
        let _lock = FileLock::acquire_sidecar(&self.lock_path, self.config.lock_timeout)?;

        let mut rows = self.load_for_write()?;
        let position = rows.iter().position(|row| &row.triple == triple);

        let outcome = match (position, refresh) {
            (Some(index), false) => {
                let code = rows[index].code.clone();
                tracing::debug!(triple = %triple, code = %code, "Resolved existing code");
                return Ok(UpsertOutcome {
                    code,
                    action: UpsertAction::Existing,
                });
            }
            (None, false) => {
                let code = codegen::generate(triple, false);
                rows.push(MappingRow {
                    code: code.clone(),
                    triple: triple.clone(),
                });
                UpsertOutcome {
                    code,
                    action: UpsertAction::Created,
                }
            }
            (Some(index), true) => {
                let previous = rows[index].code.clone();
                let mut code = codegen::generate(triple, true);
                while code == previous {
                    code = codegen::generate(triple, true);
                }
                rows[index].code = code.clone();
                UpsertOutcome {
                    code,
                    action: UpsertAction::Refreshed { previous },
                }
            }
            (None, true) => {
                let code = codegen::generate(triple, true);
                rows.push(MappingRow {
                    code: code.clone(),
                    triple: triple.clone(),
                });
                UpsertOutcome {
                    code,
                    action: UpsertAction::Created,
                }
            }
        };

        table::write_atomic(&self.table_path, &rows)?;

        tracing::info!(
            triple = %triple,
            code = %outcome.code,
            action = outcome.action.name(),
            rows = rows.len(),
            "Table updated"
        );
        Ok(outcome)
    }

    /// Load the table for a transaction, collapsing duplicate triples.
    ///
    /// The first occurrence keeps its position, the last occurrence supplies
    /// the code, so the next rewrite restores one row per triple.
    fn load_for_write(&self) -> LinkResult<Vec<MappingRow>> {
        let stored: Vec<MappingRow> = table::read_lines(&self.table_path)?;
        let mut rows: Vec<MappingRow> = Vec::with_capacity(stored.len());
        let mut index: HashMap<Triple, usize> = HashMap::with_capacity(stored.len());

        for row in stored {
            match index.get(&row.triple) {
                Some(&at) => {
                    tracing::warn!(
                        triple = %row.triple,
                        dropped = %rows[at].code,
                        kept = %row.code,
                        "Collapsing duplicate row"
                    );
                    rows[at].code = row.code;
                }
                None => {
                    index.insert(row.triple.clone(), rows.len());
                    rows.push(row);
                }
            }
        }
        Ok(rows)
    }

    /// Find the triple currently mapped to `code`.
    ///
    /// Takes no lock. Returns the first matching row in stored order, or
    /// `Ok(None)` when no row carries `code`.
    pub fn lookup(&self, code: &Code) -> LinkResult<Option<Triple>> {
        let file = match File::open(&self.table_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LinkError::StorageUnavailable {
                    context: "opening table for lookup",
                    path: self.table_path.clone(),
                    source,
                })
            }
        };

        let mut found = None;
        table::for_each_record(&self.table_path, file, |row: MappingRow| {
            if &row.code == code {
                found = Some(row.triple);
                false
            } else {
                true
            }
        })?;

        if found.is_none() {
            tracing::debug!(code = %code, "Code not found");
        }
        Ok(found)
    }

    /// Snapshot of every parsable row, unlocked, in stored order.
    pub fn rows(&self) -> LinkResult<Vec<MappingRow>> {
        table::read_lines(&self.table_path)
    }
}

/// Create `path` if it does not exist, leaving existing contents alone.
fn touch(path: &Path) -> LinkResult<()> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map(drop)
        .map_err(|source| LinkError::StorageUnavailable {
            context: "creating storage file",
            path: path.to_path_buf(),
            source,
        })
}
