// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Line formats for the persisted table and the history ledger.
//!
//! Table rows are `code keyword src creative`, history entries are
//! `old_code new_code`. Fields are separated by exactly one space and a token
//! may be empty, so lines are split on single spaces rather than on runs of
//! whitespace. Blank lines and `//` comment lines carry no row.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;

use tempfile::NamedTempFile;

use crate::error::{LinkError, LinkResult, RowParseError};
use crate::types::{Code, Token, Triple};

/// One mapping from a triple to its current code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub code: Code,
    pub triple: Triple,
}

impl FromStr for MappingRow {
    type Err = RowParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(' ').collect();
        let [code, keyword, src, creative] = fields[..] else {
            return Err(RowParseError::FieldCount {
                expected: 4,
                found: fields.len(),
            });
        };

        Ok(Self {
            code: Code::new(code)?,
            triple: Triple::new(
                Token::new("keyword", keyword)?,
                Token::new("src", src)?,
                Token::new("creative", creative)?,
            ),
        })
    }
}

impl fmt::Display for MappingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.code, self.triple.keyword, self.triple.src, self.triple.creative
        )
    }
}

/// One refresh recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub old_code: Code,
    pub new_code: Code,
}

impl FromStr for HistoryEntry {
    type Err = RowParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(' ').collect();
        let [old_code, new_code] = fields[..] else {
            return Err(RowParseError::FieldCount {
                expected: 2,
                found: fields.len(),
            });
        };

        Ok(Self {
            old_code: Code::new(old_code)?,
            new_code: Code::new(new_code)?,
        })
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.old_code, self.new_code)
    }
}

/// Read every parsable line of `path` in stored order.
///
/// A missing file reads as empty. Malformed lines are logged and skipped.
pub fn read_lines<T>(path: &Path) -> LinkResult<Vec<T>>
where
    T: FromStr<Err = RowParseError>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LinkError::StorageUnavailable {
                context: "opening for read",
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut parsed = Vec::new();
    for_each_record(path, file, |record: T| {
        parsed.push(record);
        true
    })?;
    Ok(parsed)
}

/// Stream parsable lines of `file` into `visit` until it returns `false`.
pub(crate) fn for_each_record<T, F>(path: &Path, file: File, mut visit: F) -> LinkResult<()>
where
    T: FromStr<Err = RowParseError>,
    F: FnMut(T) -> bool,
{
    let reader = BufReader::new(file);
    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes.map_err(|source| LinkError::StorageUnavailable {
            context: "reading lines",
            path: path.to_path_buf(),
            source,
        })?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping line that is not valid UTF-8"
                );
                continue;
            }
        };

        if line.trim().is_empty() || line.starts_with("//") {
            continue;
        }

        match line.parse::<T>() {
            Ok(record) => {
                if !visit(record) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed line"
                );
            }
        }
    }
    Ok(())
}

/// Replace the contents of `path` with `rows`, all or nothing.
///
/// Rows go to a temp file in the same directory, which is synced and then
/// renamed over `path`. Readers see either the old file or the new one.
pub fn write_atomic(path: &Path, rows: &[MappingRow]) -> LinkResult<()> {
    let storage_err = |context: &'static str| {
        move |source: std::io::Error| LinkError::StorageUnavailable {
            context,
            path: path.to_path_buf(),
            source,
        }
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(dir).map_err(storage_err("creating temp table"))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        for row in rows {
            writeln!(writer, "{}", row).map_err(storage_err("writing temp table"))?;
        }
        writer.flush().map_err(storage_err("flushing temp table"))?;
    }
    // Temp files are created 0600; keep whatever mode the table already had.
    if let Ok(meta) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(meta.permissions())
            .map_err(storage_err("copying table permissions"))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(storage_err("syncing temp table"))?;

    temp.persist(path)
        .map_err(|e| storage_err("replacing table")(e.error))?;

    // The rename is only durable once the directory entry is.
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(storage_err("syncing table directory"))?;
    Ok(())
}
