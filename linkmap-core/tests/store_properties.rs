// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the mapping store.
//!
//! Exercise the public API against real files in a temp directory, including
//! many writers racing on one table.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use linkmap_core::{
    Code, ConfigLoader, MappingStore, StorageConfig, Triple, UpsertAction, UpsertRequest,
};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> MappingStore {
    MappingStore::open(StorageConfig::in_dir(dir.path())).expect("Failed to open store")
}

fn triple(k: &str, s: &str, c: &str) -> Triple {
    Triple::parse(k, s, c).expect("Invalid triple")
}

fn rows_per_triple(store: &MappingStore) -> HashMap<Triple, usize> {
    let mut counts = HashMap::new();
    for row in store.rows().unwrap() {
        *counts.entry(row.triple).or_insert(0) += 1;
    }
    counts
}

/// Walk through create, repeat, refresh and both lookups.
#[test]
fn test_promo_walkthrough() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let t = triple("promoA", "newsletter", "bannerX");

    let c1 = store.upsert(&t, false).unwrap().code;
    assert_eq!(store.upsert(&t, false).unwrap().code, c1);

    let c2 = store.upsert(&t, true).unwrap().code;
    assert_ne!(c2, c1);

    let history = store.history().entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_code, c1);
    assert_eq!(history[0].new_code, c2);

    assert_eq!(store.lookup(&c2).unwrap(), Some(t));
    assert_eq!(store.lookup(&c1).unwrap(), None);
}

/// Deterministic codes survive a fresh store instance over an empty table.
#[test]
fn test_determinism_across_instances() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let t = triple("kw", "src", "cr");

    let a = open_store(&first_dir).upsert(&t, false).unwrap().code;
    let b = open_store(&second_dir).upsert(&t, false).unwrap().code;
    assert_eq!(a, b);
}

#[test]
fn test_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    for t in [
        triple("promoA", "newsletter", "bannerX"),
        triple("", "only-src", ""),
        triple("a", "", ""),
        triple(&"k".repeat(64), &"s".repeat(64), &"c".repeat(64)),
    ] {
        let code = store.upsert(&t, false).unwrap().code;
        assert_eq!(store.lookup(&code).unwrap(), Some(t));
    }
}

#[test]
fn test_not_found_on_empty_and_non_matching_table() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let probe = Code::new("deadbeefdeadbeefdeadbeefdeadbeef").unwrap();

    assert_eq!(store.lookup(&probe).unwrap(), None);

    store.upsert(&triple("k", "s", "c"), false).unwrap();
    assert_eq!(store.lookup(&probe).unwrap(), None);
}

/// Any mix of upserts and refreshes leaves one row per triple.
#[test]
fn test_dedup_invariant() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let triples = [
        triple("a", "b", "c"),
        triple("a", "b", "d"),
        triple("ab", "", "c"),
    ];

    for round in 0..6 {
        for (i, t) in triples.iter().enumerate() {
            store.upsert(t, (round + i) % 3 == 0).unwrap();
        }
    }

    let counts = rows_per_triple(&store);
    assert_eq!(counts.len(), triples.len());
    assert!(counts.values().all(|&n| n == 1));
}

#[test]
fn test_history_only_for_existing_triples() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let fresh = store.upsert(&triple("new", "one", "x"), true).unwrap();
    assert_eq!(fresh.action, UpsertAction::Created);
    assert!(store.history().entries().unwrap().is_empty());

    let again = store.upsert(&triple("new", "one", "x"), true).unwrap();
    assert_eq!(
        again.action,
        UpsertAction::Refreshed {
            previous: fresh.code.clone()
        }
    );
    let history = store.history().entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_code, fresh.code);
    assert_eq!(history[0].new_code, again.code);
}

/// Corrupt lines do not break either path, and the next rewrite drops them.
#[test]
fn test_malformed_rows_tolerated() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    std::fs::write(
        store.table_path(),
        "this is not a row at all\nZZZ k s c\n\naa k1 s1 c1\n",
    )
    .unwrap();

    assert_eq!(
        store.lookup(&Code::new("aa").unwrap()).unwrap(),
        Some(triple("k1", "s1", "c1"))
    );

    let code = store.upsert(&triple("k2", "s2", "c2"), false).unwrap().code;
    assert_eq!(
        std::fs::read_to_string(store.table_path()).unwrap(),
        format!("aa k1 s1 c1\n{} k2 s2 c2\n", code)
    );
}

/// A row with bytes that are not UTF-8 is skipped by readers and writers.
#[test]
fn test_invalid_utf8_row_tolerated() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    std::fs::write(
        store.table_path(),
        b"aa k1 s1 c1\nbb k\xff s c\ncc k2 s2 c2\n",
    )
    .unwrap();

    assert_eq!(
        store.lookup(&Code::new("cc").unwrap()).unwrap(),
        Some(triple("k2", "s2", "c2"))
    );
    assert_eq!(store.lookup(&Code::new("bb").unwrap()).unwrap(), None);

    let code = store.upsert(&triple("x", "y", "z"), false).unwrap().code;
    assert_eq!(store.lookup(&code).unwrap(), Some(triple("x", "y", "z")));
    assert_eq!(store.rows().unwrap().len(), 3);
}

/// Readers running alongside a writer only ever see complete tables.
#[test]
fn test_readers_never_see_partial_table() {
    const REFRESHES: usize = 200;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    let stable = triple("stable", "row", "kept");
    let stable_code = store.upsert(&stable, false).unwrap().code;
    let churned = triple("churned", "row", "refreshed");
    store.upsert(&churned, false).unwrap();
    for i in 0..20 {
        store
            .upsert(&triple(&format!("filler{}", i), "src", "cr"), false)
            .unwrap();
    }
    let expected_rows = store.rows().unwrap().len();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        let stable = stable.clone();
        thread::spawn(move || {
            let mut reads = 0usize;
            loop {
                assert_eq!(store.rows().unwrap().len(), expected_rows);
                assert_eq!(store.lookup(&stable_code).unwrap(), Some(stable.clone()));
                reads += 1;
                if done.load(Ordering::Acquire) {
                    return reads;
                }
            }
        })
    };

    let mut last = None;
    for _ in 0..REFRESHES {
        last = Some(store.upsert(&churned, true).unwrap().code);
    }
    done.store(true, Ordering::Release);

    assert!(reader.join().unwrap() > 0);
    let last = last.unwrap();
    assert_eq!(store.lookup(&last).unwrap(), Some(churned));
    assert_eq!(store.rows().unwrap().len(), expected_rows);
}

/// N writers racing on one triple agree on the code and leave one row.
#[test]
fn test_concurrent_upserts_same_triple() {
    const WRITERS: usize = 16;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    let barrier = Arc::new(Barrier::new(WRITERS));
    let t = triple("race", "same", "triple");

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let t = t.clone();
            thread::spawn(move || {
                barrier.wait();
                store.upsert(&t, false).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let codes: HashSet<_> = outcomes.iter().map(|o| o.code.clone()).collect();
    assert_eq!(codes.len(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| o.action == UpsertAction::Created)
            .count(),
        1
    );
    assert_eq!(store.rows().unwrap().len(), 1);
}

/// Writers on distinct triples never lose each other's rows.
#[test]
fn test_concurrent_upserts_distinct_triples() {
    const WRITERS: usize = 12;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let t = triple(&format!("kw{}", i), "src", "cr");
                barrier.wait();
                (t.clone(), store.upsert(&t, i % 2 == 0).unwrap().code)
            })
        })
        .collect();

    for handle in handles {
        let (t, code) = handle.join().unwrap();
        assert_eq!(store.lookup(&code).unwrap(), Some(t));
    }
    let counts = rows_per_triple(&store);
    assert_eq!(counts.len(), WRITERS);
    assert!(counts.values().all(|&n| n == 1));
}

/// Racing refreshes each log one hop, and the hops chain back to the start.
#[test]
fn test_concurrent_refreshes_chain_history() {
    const WRITERS: usize = 8;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir));
    let t = triple("chain", "of", "refreshes");
    let start = store.upsert(&t, false).unwrap().code;
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let t = t.clone();
            thread::spawn(move || {
                barrier.wait();
                store.upsert(&t, true).unwrap().code
            })
        })
        .collect();
    let returned: HashSet<Code> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(returned.len(), WRITERS);

    let history = store.history().entries().unwrap();
    assert_eq!(history.len(), WRITERS);

    let olds: HashSet<Code> = history.iter().map(|e| e.old_code.clone()).collect();
    let news: HashSet<Code> = history.iter().map(|e| e.new_code.clone()).collect();
    assert_eq!(news, returned);

    let current = store.rows().unwrap()[0].code.clone();
    let mut expected_olds = news.clone();
    expected_olds.remove(&current);
    expected_olds.insert(start);
    assert_eq!(olds, expected_olds);
}

/// Request parsing feeds the store the same triple the caller would expect.
#[test]
fn test_request_to_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let req = UpsertRequest::from_params(Some("promo A"), None, Some("banner#X"), false).unwrap();
    let code = store.upsert(&req.triple, req.refresh).unwrap().code;
    assert_eq!(
        store.lookup(&code).unwrap(),
        Some(triple("promoA", "unknown", "bannerX"))
    );
}

#[test]
fn test_store_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("linkmap.yaml");
    std::fs::write(
        &config_path,
        format!(
            "storage:\n  data_dir: {}\n  mappings_file: m.txt\n  history_file: h.txt\n",
            dir.path().join("nested").join("data").display()
        ),
    )
    .unwrap();

    let config = ConfigLoader::load_file(&config_path).unwrap();
    let store = MappingStore::open(config.storage).unwrap();
    store.upsert(&triple("k", "s", "c"), false).unwrap();

    assert!(dir.path().join("nested/data/m.txt").exists());
    assert!(dir.path().join("nested/data/h.txt").exists());
    assert!(dir.path().join("nested/data/m.txt.lock").exists());
}
