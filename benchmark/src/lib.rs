// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! linkmap Benchmarking Support
//!
//! Builds seeded stores for the criterion benches in `benches/`.
//!
//! # Benchmark Categories
//!
//! - **Lookup**: unlocked linear scan, hit at the tail and miss
//! - **Upsert**: existing hit (no rewrite), create, refresh

pub mod workload;

pub use workload::SeededStore;
