// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pre-populated stores for benchmarking.
//!
//! Lookup and upsert cost grows with table size (linear scan and full
//! rewrite), so benches run against tables of several sizes.

use linkmap_core::{Code, MappingStore, StorageConfig, Token, Triple};
use tempfile::TempDir;

/// A store in a temp directory, removed on drop.
pub struct SeededStore {
    pub store: MappingStore,
    /// Codes in table order.
    pub codes: Vec<Code>,
    _dir: TempDir,
}

/// Deterministic triple number `i`.
pub fn triple(i: usize) -> Triple {
    Triple::new(
        Token::sanitize(&format!("kw{}", i)),
        Token::sanitize(&format!("src{}", i % 17)),
        Token::sanitize(&format!("cr{}", i % 5)),
    )
}

impl SeededStore {
    /// Create a store holding `rows` mappings.
    pub fn with_rows(rows: usize) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let store = MappingStore::open(StorageConfig::in_dir(dir.path()))
            .map_err(std::io::Error::other)?;

        let mut codes = Vec::with_capacity(rows);
        for i in 0..rows {
            let outcome = store
                .upsert(&triple(i), false)
                .map_err(std::io::Error::other)?;
            codes.push(outcome.code);
        }

        Ok(Self {
            store,
            codes,
            _dir: dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store_has_rows() {
        let seeded = SeededStore::with_rows(25).unwrap();
        assert_eq!(seeded.codes.len(), 25);
        assert_eq!(seeded.store.rows().unwrap().len(), 25);
        assert_eq!(
            seeded.store.lookup(&seeded.codes[24]).unwrap(),
            Some(triple(24))
        );
    }
}
